/// Sparse numeric vector: non-zero entries only, indices strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector {
    dim: usize,
    indices: Vec<u32>,
    values: Vec<f64>,
}

impl SparseVector {
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Entries must be sorted by index, strictly increasing, all within `dim`.
    pub fn from_entries(dim: usize, entries: Vec<(u32, f64)>) -> Self {
        debug_assert!(
            entries.windows(2).all(|w| w[0].0 < w[1].0),
            "entries must be strictly increasing by index"
        );
        debug_assert!(entries.iter().all(|&(i, _)| (i as usize) < dim));
        let (indices, values) = entries.into_iter().unzip();
        Self {
            dim,
            indices,
            values,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Scales the vector to unit Euclidean length. The zero vector is left
    /// untouched.
    pub fn l2_normalize(&mut self) {
        let norm = self.values.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }

    /// Horizontal concatenation: `self` occupies columns `0..self.dim`,
    /// `other` is shifted up by `self.dim`.
    pub fn hstack(&self, other: &SparseVector) -> SparseVector {
        let dim = self.dim + other.dim;
        debug_assert!(dim <= u32::MAX as usize, "stacked width exceeds u32 range");
        let mut indices = Vec::with_capacity(self.nnz() + other.nnz());
        let mut values = Vec::with_capacity(self.nnz() + other.nnz());
        indices.extend_from_slice(&self.indices);
        values.extend_from_slice(&self.values);
        let offset = self.dim as u32;
        indices.extend(other.indices.iter().map(|i| i + offset));
        values.extend_from_slice(&other.values);
        SparseVector {
            dim,
            indices,
            values,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/features/vector.rs"]
mod tests;
