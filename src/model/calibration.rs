use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalibrationLoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid calibration resource: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("calibration table has no entry for key `{key}`")]
pub struct CalibrationKeyError {
    pub key: String,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScaleParams {
    pub mean: f64,
    pub std: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ThresholdPair {
    pub sensitive: f64,
    pub specific: f64,
}

/// The two pre-calibrated decision cutoffs: sensitive trades precision for
/// recall, specific the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdType {
    Sensitive,
    Specific,
}

impl ThresholdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdType::Sensitive => "sensitive",
            ThresholdType::Specific => "specific",
        }
    }
}

impl FromStr for ThresholdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sensitive" => Ok(ThresholdType::Sensitive),
            "specific" => Ok(ThresholdType::Specific),
            other => Err(format!(
                "invalid threshold type `{}` (use sensitive|specific)",
                other
            )),
        }
    }
}

impl fmt::Display for ThresholdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-model scaling parameters and decision thresholds, loaded once at
/// startup and shared read-only afterwards. The shipped resource carries
/// scale keys `svm`/`ptyp` and threshold keys `svm`/`svm_ptyp`/`ptyp`.
#[derive(Debug, Clone, Deserialize)]
pub struct CalibrationTable {
    scales: HashMap<String, ScaleParams>,
    thresholds: HashMap<String, ThresholdPair>,
}

impl CalibrationTable {
    pub fn load(path: &Path) -> Result<Self, CalibrationLoadError> {
        tracing::debug!(path = %path.display(), "loading calibration table");
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CalibrationLoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn scale(&self, model_name: &str) -> Result<ScaleParams, CalibrationKeyError> {
        self.scales
            .get(model_name)
            .copied()
            .ok_or_else(|| CalibrationKeyError {
                key: format!("scales.{}", model_name),
            })
    }

    pub fn threshold(
        &self,
        model_key: &str,
        threshold_type: ThresholdType,
    ) -> Result<f64, CalibrationKeyError> {
        let pair = self
            .thresholds
            .get(model_key)
            .ok_or_else(|| CalibrationKeyError {
                key: format!("thresholds.{}", model_key),
            })?;
        Ok(match threshold_type {
            ThresholdType::Sensitive => pair.sensitive,
            ThresholdType::Specific => pair.specific,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/calibration.rs"]
mod tests;
