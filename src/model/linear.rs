use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use memmap2::Mmap;
use thiserror::Error;

use crate::features::vector::SparseVector;

const MAGIC: &[u8; 4] = b"RCTW";
const ENDIAN_TAG: u32 = 0x1234_5678;
const HEADER_BYTES: usize = 64;

#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid model resource: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("feature vector width {actual} does not match model width {expected}")]
pub struct DimensionMismatchError {
    pub expected: usize,
    pub actual: usize,
}

/// Binary linear model held in compact sparse form: only the non-zero
/// coefficients are stored, so a model that would be gigabytes dense loads
/// and scores without ever materializing a dense array.
#[derive(Debug, Clone)]
pub struct SparseLinearModel {
    indices: Vec<u32>,
    values: Vec<f64>,
    dim: usize,
    intercept: f64,
}

impl SparseLinearModel {
    /// Indices must be strictly increasing and within `dim`.
    pub fn from_parts(
        dim: usize,
        indices: Vec<u32>,
        values: Vec<f64>,
        intercept: f64,
    ) -> Result<Self, ModelLoadError> {
        if indices.len() != values.len() {
            return Err(ModelLoadError::Invalid(format!(
                "coefficient index/value length mismatch: {} vs {}",
                indices.len(),
                values.len()
            )));
        }
        for w in indices.windows(2) {
            if w[0] >= w[1] {
                return Err(ModelLoadError::Invalid(
                    "coefficient indices not strictly increasing".to_string(),
                ));
            }
        }
        if let Some(&last) = indices.last() {
            if last as usize >= dim {
                return Err(ModelLoadError::Invalid(format!(
                    "coefficient index {} out of bounds for width {}",
                    last, dim
                )));
            }
        }
        Ok(Self {
            indices,
            values,
            dim,
            intercept,
        })
    }

    /// Loads a model resource from disk. Plain files are memory-mapped;
    /// `.gz` resources are decompressed into memory first.
    pub fn load(path: &Path) -> Result<Self, ModelLoadError> {
        tracing::debug!(path = %path.display(), "loading model");
        let model = if path.extension().is_some_and(|ext| ext == "gz") {
            let mut bytes = Vec::new();
            GzDecoder::new(File::open(path)?).read_to_end(&mut bytes)?;
            Self::from_bytes(&bytes)?
        } else {
            let file = File::open(path)?;
            let mmap = unsafe { Mmap::map(&file)? };
            Self::from_bytes(&mmap[..])?
        };
        tracing::debug!(
            path = %path.display(),
            dim = model.dim,
            nnz = model.nnz(),
            "model loaded"
        );
        Ok(model)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ModelLoadError> {
        if bytes.len() < HEADER_BYTES {
            return Err(ModelLoadError::Invalid(
                "model resource too small".to_string(),
            ));
        }
        if &bytes[0..4] != MAGIC {
            return Err(ModelLoadError::Invalid(
                "invalid magic; expected RCTW".to_string(),
            ));
        }
        let version_major = read_u16(bytes, 4);
        let version_minor = read_u16(bytes, 6);
        if version_major != 1 || version_minor != 0 {
            return Err(ModelLoadError::Invalid(format!(
                "unsupported version: {}.{}",
                version_major, version_minor
            )));
        }
        if read_u32(bytes, 8) != ENDIAN_TAG {
            return Err(ModelLoadError::Invalid(
                "unsupported endianness tag".to_string(),
            ));
        }
        if read_u32(bytes, 12) as usize != HEADER_BYTES {
            return Err(ModelLoadError::Invalid(format!(
                "invalid header_size; expected {}",
                HEADER_BYTES
            )));
        }
        let dim = read_u64(bytes, 16) as usize;
        let nnz = read_u64(bytes, 24) as usize;
        let intercept = f64::from_bits(read_u64(bytes, 32));
        if read_u64(bytes, 40) != 0 {
            return Err(ModelLoadError::Invalid(
                "reserved header field must be zero".to_string(),
            ));
        }
        let file_bytes = read_u64(bytes, 48) as usize;
        if file_bytes != bytes.len() {
            return Err(ModelLoadError::Invalid(
                "file_bytes does not match resource length".to_string(),
            ));
        }
        let header_crc = read_u64(bytes, 56);
        let mut header = bytes[0..HEADER_BYTES].to_vec();
        header[56..64].fill(0);
        if crc64_ecma(&header) != header_crc {
            return Err(ModelLoadError::Invalid(
                "header_crc64 mismatch".to_string(),
            ));
        }

        let expected_len = HEADER_BYTES
            .checked_add(
                nnz.checked_mul(12)
                    .ok_or_else(|| ModelLoadError::Invalid("nnz overflow".to_string()))?,
            )
            .ok_or_else(|| ModelLoadError::Invalid("nnz overflow".to_string()))?;
        if bytes.len() != expected_len {
            return Err(ModelLoadError::Invalid(format!(
                "resource length {} does not match nnz {}",
                bytes.len(),
                nnz
            )));
        }

        let indices = read_u32_vec(bytes, HEADER_BYTES, nnz);
        let values = read_f64_vec(bytes, HEADER_BYTES + nnz * 4, nnz);
        Self::from_parts(dim, indices, values, intercept)
    }

    /// Serializes the model into the compact resource format. Used by
    /// conversion tooling and fixture tests; this crate never produces new
    /// models.
    pub fn to_bytes(&self) -> Vec<u8> {
        let nnz = self.indices.len();
        let file_bytes = HEADER_BYTES + nnz * 12;
        let mut out = Vec::with_capacity(file_bytes);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&ENDIAN_TAG.to_le_bytes());
        out.extend_from_slice(&(HEADER_BYTES as u32).to_le_bytes());
        out.extend_from_slice(&(self.dim as u64).to_le_bytes());
        out.extend_from_slice(&(nnz as u64).to_le_bytes());
        out.extend_from_slice(&self.intercept.to_bits().to_le_bytes());
        out.extend_from_slice(&0u64.to_le_bytes());
        out.extend_from_slice(&(file_bytes as u64).to_le_bytes());
        out.extend_from_slice(&0u64.to_le_bytes());
        let crc = crc64_ecma(&out);
        out[56..64].copy_from_slice(&crc.to_le_bytes());
        for i in &self.indices {
            out.extend_from_slice(&i.to_le_bytes());
        }
        for v in &self.values {
            out.extend_from_slice(&v.to_bits().to_le_bytes());
        }
        out
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// `x · coef + intercept` for one sparse vector. The record-side vector
    /// is small, so each of its entries is looked up in the coefficient
    /// arrays by binary search.
    pub fn decision_score(&self, x: &SparseVector) -> Result<f64, DimensionMismatchError> {
        if x.dim() != self.dim {
            return Err(DimensionMismatchError {
                expected: self.dim,
                actual: x.dim(),
            });
        }
        let mut score = self.intercept;
        for (column, value) in x.iter() {
            if let Ok(k) = self.indices.binary_search(&column) {
                score += value * self.values[k];
            }
        }
        Ok(score)
    }

    pub fn decision_function(
        &self,
        xs: &[SparseVector],
    ) -> Result<Vec<f64>, DimensionMismatchError> {
        xs.iter().map(|x| self.decision_score(x)).collect()
    }

    /// Sign of the decision score as 0/1 (score > 0).
    pub fn predict(&self, xs: &[SparseVector]) -> Result<Vec<u8>, DimensionMismatchError> {
        Ok(self
            .decision_function(xs)?
            .into_iter()
            .map(|s| u8::from(s > 0.0))
            .collect())
    }

    /// Logistic sigmoid of the decision scores. Only meaningful when the
    /// model was fit under a log-loss objective; this is not enforced here.
    pub fn predict_proba(&self, xs: &[SparseVector]) -> Result<Vec<f64>, DimensionMismatchError> {
        Ok(self
            .decision_function(xs)?
            .into_iter()
            .map(|s| 1.0 / (1.0 + (-s).exp()))
            .collect())
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    let raw: [u8; 2] = bytes[offset..offset + 2]
        .try_into()
        .expect("slice length should be exactly 2");
    u16::from_le_bytes(raw)
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let raw: [u8; 4] = bytes[offset..offset + 4]
        .try_into()
        .expect("slice length should be exactly 4");
    u32::from_le_bytes(raw)
}

fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    let raw: [u8; 8] = bytes[offset..offset + 8]
        .try_into()
        .expect("slice length should be exactly 8");
    u64::from_le_bytes(raw)
}

fn read_u32_vec(bytes: &[u8], offset: usize, len: usize) -> Vec<u32> {
    bytes[offset..offset + len * 4]
        .chunks_exact(4)
        .map(|chunk| {
            u32::from_le_bytes(
                chunk
                    .try_into()
                    .expect("chunk size from chunks_exact(4) must be 4"),
            )
        })
        .collect()
}

fn read_f64_vec(bytes: &[u8], offset: usize, len: usize) -> Vec<f64> {
    bytes[offset..offset + len * 8]
        .chunks_exact(8)
        .map(|chunk| {
            f64::from_bits(u64::from_le_bytes(
                chunk
                    .try_into()
                    .expect("chunk size from chunks_exact(8) must be 8"),
            ))
        })
        .collect()
}

pub fn crc64_ecma(bytes: &[u8]) -> u64 {
    let mut crc = 0u64;
    for &b in bytes {
        crc ^= (b as u64) << 56;
        for _ in 0..8 {
            if (crc & 0x8000_0000_0000_0000) != 0 {
                crc = (crc << 1) ^ 0x42F0_E1EB_A9EA_3693;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/linear.rs"]
mod tests;
