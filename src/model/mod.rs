pub mod calibration;
pub mod ensemble;
pub mod linear;

pub use calibration::{CalibrationTable, ScaleParams, ThresholdPair, ThresholdType};
pub use ensemble::OneVsAllModel;
pub use linear::{DimensionMismatchError, ModelLoadError, SparseLinearModel};
