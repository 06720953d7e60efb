use std::collections::BTreeMap;

use crate::features::stopwords::is_stop_word;
use crate::features::vector::SparseVector;

/// Width of one hashed feature block (2^20), matching the width the
/// production model was trained with.
pub const DEFAULT_DIM: usize = 1 << 20;

/// Vocabulary-free text vectorizer using the hashing trick.
///
/// Tokens are maximal runs of word characters of length >= 2, lowercased by
/// default, with fixed English stop words dropped. Each surviving token is
/// FNV-1a-64 hashed; the hash picks the column (mod `dim`) and an
/// independent high bit picks the sign. Signed counts are accumulated and
/// the finished vector is scaled to unit L2 length. The output is a pure
/// function of the input text and this configuration.
#[derive(Debug, Clone)]
pub struct HashingVectorizer {
    dim: usize,
    lowercase: bool,
}

impl Default for HashingVectorizer {
    fn default() -> Self {
        Self {
            dim: DEFAULT_DIM,
            lowercase: true,
        }
    }
}

impl HashingVectorizer {
    pub fn new(dim: usize, lowercase: bool) -> Self {
        Self { dim, lowercase }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn transform(&self, text: &str) -> SparseVector {
        let mut columns: BTreeMap<u32, f64> = BTreeMap::new();
        for token in tokenize(text) {
            let token = if self.lowercase {
                token.to_lowercase()
            } else {
                token.to_string()
            };
            if is_stop_word(&token) {
                continue;
            }
            let h = fnv1a64(token.as_bytes());
            let column = (h % self.dim as u64) as u32;
            let sign = if h & SIGN_BIT == 0 { 1.0 } else { -1.0 };
            *columns.entry(column).or_insert(0.0) += sign;
        }
        columns.retain(|_, v| *v != 0.0);
        let mut vector = SparseVector::from_entries(self.dim, columns.into_iter().collect());
        vector.l2_normalize();
        vector
    }
}

const SIGN_BIT: u64 = 1 << 63;

/// Maximal runs of word characters (alphanumeric or underscore), keeping
/// only runs of two or more characters.
fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| t.chars().count() >= 2)
}

pub fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[cfg(test)]
#[path = "../../tests/src_inline/features/hashing.rs"]
mod tests;
