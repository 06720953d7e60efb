pub mod predict;
pub mod ptyp;
