//! Dense pairwise similarity storage.

use crate::error::{Result, SimilarityError};

/// Dense `n × n` matrix of cosine similarities, row-major.
///
/// Row and column `i` both refer to corpus row `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    dim: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Wrap row-major values; fails unless `values.len() == dim * dim`
    pub fn from_raw(dim: usize, values: Vec<f32>) -> Result<Self> {
        let expected = dim
            .checked_mul(dim)
            .ok_or(SimilarityError::DimensionMismatch {
                dim,
                expected: usize::MAX,
                found: values.len(),
            })?;
        if values.len() != expected {
            return Err(SimilarityError::DimensionMismatch {
                dim,
                expected,
                found: values.len(),
            });
        }
        Ok(Self { dim, values })
    }

    /// Number of rows (= number of items)
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i < self.dim && j < self.dim {
            Some(self.values[i * self.dim + j])
        } else {
            None
        }
    }

    pub fn row(&self, i: usize) -> Option<&[f32]> {
        if i < self.dim {
            Some(&self.values[i * self.dim..(i + 1) * self.dim])
        } else {
            None
        }
    }

    /// Row-major values
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f32> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_checks_size() {
        let err = SimilarityMatrix::from_raw(2, vec![1.0, 0.5, 0.5]).unwrap_err();
        assert_eq!(
            err,
            SimilarityError::DimensionMismatch {
                dim: 2,
                expected: 4,
                found: 3
            }
        );
    }

    #[test]
    fn test_accessors() {
        let m = SimilarityMatrix::from_raw(2, vec![1.0, 0.25, 0.25, 1.0]).unwrap();
        assert_eq!(m.dim(), 2);
        assert_eq!(m.get(0, 1), Some(0.25));
        assert_eq!(m.get(2, 0), None);
        assert_eq!(m.row(1), Some(&[0.25, 1.0][..]));
        assert!(m.row(2).is_none());
    }

    #[test]
    fn test_empty_matrix() {
        let m = SimilarityMatrix::from_raw(0, Vec::new()).unwrap();
        assert_eq!(m.dim(), 0);
        assert!(m.row(0).is_none());
    }
}
