//! Scoring core for RCT screening: a pre-trained sparse linear model over
//! hashed title/abstract features, blended with an optional publication-type
//! override signal and calibrated decision thresholds.

pub mod features;
pub mod model;
pub mod pipeline;
pub mod report;

pub use model::calibration::{CalibrationTable, ThresholdType};
pub use model::linear::SparseLinearModel;
pub use pipeline::predict::{
    InputRecord, PredictOptions, Prediction, RawScores, RctScreener,
};
pub use pipeline::ptyp::PtypSignal;
