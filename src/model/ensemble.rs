use crate::features::vector::SparseVector;
use crate::model::linear::{DimensionMismatchError, SparseLinearModel};

/// One-vs-all multi-class wrapper over binary sparse linear scorers. Not
/// used by the RCT pipeline, which is binary; kept as the general form of
/// the scorer contract.
#[derive(Debug, Clone)]
pub struct OneVsAllModel {
    models: Vec<SparseLinearModel>,
    classes: Vec<String>,
}

impl OneVsAllModel {
    /// One scorer per class label, in matching order.
    pub fn new(models: Vec<SparseLinearModel>, classes: Vec<String>) -> Self {
        assert_eq!(
            models.len(),
            classes.len(),
            "one class label per model required"
        );
        assert!(!models.is_empty(), "at least one class required");
        Self { models, classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Decision scores for every class: one row of length `xs.len()` per
    /// class, in class order.
    pub fn decision_function(
        &self,
        xs: &[SparseVector],
    ) -> Result<Vec<Vec<f64>>, DimensionMismatchError> {
        self.models.iter().map(|m| m.decision_function(xs)).collect()
    }

    /// Arg-max class per input; ties resolve to the lowest class index.
    pub fn predict(&self, xs: &[SparseVector]) -> Result<Vec<String>, DimensionMismatchError> {
        let scores = self.decision_function(xs)?;
        let mut out = Vec::with_capacity(xs.len());
        for i in 0..xs.len() {
            let mut best = 0usize;
            for k in 1..self.models.len() {
                if scores[k][i] > scores[best][i] {
                    best = k;
                }
            }
            out.push(self.classes[best].clone());
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/ensemble.rs"]
mod tests;
