use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::hashing::HashingVectorizer;
use crate::model::calibration::{
    CalibrationKeyError, CalibrationLoadError, CalibrationTable, ThresholdType,
};
use crate::model::linear::{DimensionMismatchError, ModelLoadError, SparseLinearModel};
use crate::pipeline::ptyp::{InvalidPtypFlagError, PtypSignal, resolve_ptyp};

const SCALE_SVM: &str = "svm";
const SCALE_PTYP: &str = "ptyp";

/// One input document. `use_ptyp` is optional at the boundary because the
/// flag arrives from an external document; a missing value is handled by
/// the ptyp resolver, not silently defaulted.
#[derive(Debug, Clone, Deserialize)]
pub struct InputRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub ptyp: Vec<String>,
    #[serde(default)]
    pub use_ptyp: Option<bool>,
}

/// Which calibrated model produced the active score for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Svm,
    SvmPtyp,
}

impl ModelKind {
    pub fn as_key(&self) -> &'static str {
        match self {
            ModelKind::Svm => "svm",
            ModelKind::SvmPtyp => "svm_ptyp",
        }
    }
}

/// All intermediate named scores for one record, kept for audit output.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ScoreBundle {
    pub ptyp: f64,
    pub svm: f64,
    pub svm_ptyp: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub id: String,
    pub model: ModelKind,
    pub score: f64,
    pub threshold_type: ThresholdType,
    pub threshold_value: f64,
    pub is_rct: bool,
    pub ptyp_rct: i8,
    pub scores: ScoreBundle,
}

/// Raw-scores mode output: unscaled decision scores and raw ptyp signals,
/// for callers recalibrating offline.
#[derive(Debug, Clone, Serialize)]
pub struct RawScores {
    #[serde(rename = "svms")]
    pub svm: Vec<f64>,
    #[serde(rename = "ptyps")]
    pub ptyp: Vec<i8>,
}

#[derive(Debug, Clone)]
pub struct PredictOptions {
    pub threshold_type: ThresholdType,
    /// When false, the whole batch is scored without the ptyp override,
    /// ignoring per-record flags.
    pub auto_use_ptyp: bool,
    /// When true, a missing or malformed `use_ptyp` rejects the batch.
    pub strict_ptyp: bool,
}

impl Default for PredictOptions {
    fn default() -> Self {
        Self {
            threshold_type: ThresholdType::Sensitive,
            auto_use_ptyp: true,
            strict_ptyp: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ScreenerLoadError {
    #[error(transparent)]
    Model(#[from] ModelLoadError),
    #[error(transparent)]
    Calibration(#[from] CalibrationLoadError),
    #[error(transparent)]
    Dimension(#[from] DimensionMismatchError),
}

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Dimension(#[from] DimensionMismatchError),
    #[error(transparent)]
    Calibration(#[from] CalibrationKeyError),
    #[error(transparent)]
    PtypFlag(#[from] InvalidPtypFlagError),
}

/// The loaded screening pipeline: sparse linear model, calibration table
/// and hashing vectorizer. Immutable after construction, so one instance
/// may be shared across threads and batches freely.
#[derive(Debug, Clone)]
pub struct RctScreener {
    model: SparseLinearModel,
    calibration: CalibrationTable,
    vectorizer: HashingVectorizer,
}

impl RctScreener {
    /// The model scores the concatenation of an abstract-derived and a
    /// title-derived feature block, so its width must be exactly twice the
    /// vectorizer width. Checked here once instead of failing per record.
    pub fn new(
        model: SparseLinearModel,
        calibration: CalibrationTable,
        vectorizer: HashingVectorizer,
    ) -> Result<Self, DimensionMismatchError> {
        let expected = vectorizer.dim() * 2;
        if model.dim() != expected {
            return Err(DimensionMismatchError {
                expected,
                actual: model.dim(),
            });
        }
        Ok(Self {
            model,
            calibration,
            vectorizer,
        })
    }

    /// Loads model and calibration resources once at startup, with the
    /// default vectorizer configuration the model was trained against.
    pub fn load(model_path: &Path, calibration_path: &Path) -> Result<Self, ScreenerLoadError> {
        let model = SparseLinearModel::load(model_path)?;
        let calibration = CalibrationTable::load(calibration_path)?;
        Ok(Self::new(model, calibration, HashingVectorizer::default())?)
    }

    pub fn predict(
        &self,
        records: &[InputRecord],
        opts: &PredictOptions,
    ) -> Result<Vec<Prediction>, PredictError> {
        let signals = self.resolve_signals(records, opts)?;
        let svm_raw = self.svm_scores(records)?;
        let ptyp_scale = self.calibration.scale(SCALE_PTYP)?;
        let svm_scale = self.calibration.scale(SCALE_SVM)?;

        let mut out = Vec::with_capacity(records.len());
        for ((record, signal), raw) in records.iter().zip(&signals).zip(&svm_raw) {
            // An absent signal contributes exactly 0, whatever the scaling
            // formula would have produced for -1.
            let ptyp = if signal.is_absent() {
                0.0
            } else {
                (f64::from(signal.as_int()) - ptyp_scale.mean) / ptyp_scale.std
            };
            let svm = (raw - svm_scale.mean) / svm_scale.std;
            let scores = ScoreBundle {
                ptyp,
                svm,
                svm_ptyp: svm + ptyp,
            };
            let model = if signal.is_absent() {
                ModelKind::Svm
            } else {
                ModelKind::SvmPtyp
            };
            let score = match model {
                ModelKind::Svm => scores.svm,
                ModelKind::SvmPtyp => scores.svm_ptyp,
            };
            let threshold_value = self
                .calibration
                .threshold(model.as_key(), opts.threshold_type)?;
            out.push(Prediction {
                id: record.id.clone(),
                model,
                score,
                threshold_type: opts.threshold_type,
                threshold_value,
                is_rct: score >= threshold_value,
                ptyp_rct: signal.as_int(),
                scores,
            });
        }
        tracing::debug!(n_records = records.len(), "scored batch");
        Ok(out)
    }

    /// Bypasses scaling, model selection and thresholding: unscaled
    /// decision scores plus raw ptyp signals.
    pub fn raw_scores(
        &self,
        records: &[InputRecord],
        opts: &PredictOptions,
    ) -> Result<RawScores, PredictError> {
        let signals = self.resolve_signals(records, opts)?;
        let svm = self.svm_scores(records)?;
        Ok(RawScores {
            svm,
            ptyp: signals.iter().map(PtypSignal::as_int).collect(),
        })
    }

    fn resolve_signals(
        &self,
        records: &[InputRecord],
        opts: &PredictOptions,
    ) -> Result<Vec<PtypSignal>, InvalidPtypFlagError> {
        if !opts.auto_use_ptyp {
            return Ok(vec![PtypSignal::Absent; records.len()]);
        }
        records
            .iter()
            .map(|r| resolve_ptyp(&r.id, r.use_ptyp, &r.ptyp, opts.strict_ptyp))
            .collect()
    }

    fn svm_scores(&self, records: &[InputRecord]) -> Result<Vec<f64>, DimensionMismatchError> {
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            let title = self.vectorizer.transform(&record.title);
            let body = self
                .vectorizer
                .transform(&format!("{}\n\n{}", record.title, record.abstract_text));
            // Body block first, title block second: the layout the model
            // was trained on.
            out.push(self.model.decision_score(&body.hstack(&title))?);
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/predict.rs"]
mod tests;
