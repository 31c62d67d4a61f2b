//! Similarity Matrix Builder.
//!
//! Computes cosine similarity for every pair of feature vectors. Rows are
//! split into chunks and each rayon worker owns its chunk of the output
//! buffer outright, so no locking is involved.

use crate::error::{Result, SimilarityError};
use crate::matrix::SimilarityMatrix;
use pipeline::FeatureVector;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{info, instrument};

/// Rows handed to one rayon task at a time
const DEFAULT_ROWS_PER_TASK: usize = 16;

/// Cosine similarity: `a·b / (‖a‖‖b‖)`, or 0 when either norm is 0.
pub fn cosine_similarity(a: &FeatureVector, b: &FeatureVector) -> f32 {
    let denominator = a.norm() * b.norm();
    if denominator == 0.0 {
        return 0.0;
    }
    (a.dot(b) as f64 / denominator) as f32
}

/// Builds a `SimilarityMatrix` from a slice of feature vectors.
#[derive(Debug, Clone)]
pub struct SimilarityBuilder {
    rows_per_task: usize,
}

impl SimilarityBuilder {
    pub fn new() -> Self {
        Self {
            rows_per_task: DEFAULT_ROWS_PER_TASK,
        }
    }

    /// Rows per parallel task (minimum 1)
    pub fn with_rows_per_task(mut self, rows: usize) -> Self {
        self.rows_per_task = rows.max(1);
        self
    }

    /// Compute the full matrix.
    ///
    /// ## Algorithm
    /// 1. Check every vector has the same non-zero width
    /// 2. Precompute each vector's norm once
    /// 3. For each row chunk in parallel, fill `m[i][j]` with the sparse
    ///    dot product divided by the norms
    /// 4. Force the diagonal to 1.0 (non-zero vector) or 0.0 (zero vector)
    ///
    /// Dot products are exact integers and the same norms are used for
    /// `(i, j)` and `(j, i)`, so the result is exactly symmetric.
    ///
    /// # Returns
    /// * `Ok(SimilarityMatrix)` - `vectors.len()` square, values in [0, 1]
    /// * `Err(WidthMismatch)` - Vectors from different vocabularies
    /// * `Err(EmptyVocabulary)` - Vector width is 0
    #[instrument(skip_all, fields(items = vectors.len()))]
    pub fn build(&self, vectors: &[FeatureVector]) -> Result<SimilarityMatrix> {
        let start = Instant::now();
        let n = vectors.len();

        if let Some(first) = vectors.first() {
            let width = first.len();
            if width == 0 {
                return Err(SimilarityError::EmptyVocabulary);
            }
            if let Some((row, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != width) {
                return Err(SimilarityError::WidthMismatch {
                    row,
                    expected: width,
                    found: v.len(),
                });
            }
        }

        let norms: Vec<f64> = vectors.par_iter().map(FeatureVector::norm).collect();
        let mut values = vec![0.0f32; n * n];

        if n > 0 {
            values
                .par_chunks_mut(n * self.rows_per_task)
                .enumerate()
                .for_each(|(chunk_idx, chunk)| {
                    let first_row = chunk_idx * self.rows_per_task;
                    for (offset, row) in chunk.chunks_mut(n).enumerate() {
                        let i = first_row + offset;
                        fill_row(i, row, vectors, &norms);
                    }
                });
        }

        let zero_rows = norms.iter().filter(|&&norm| norm == 0.0).count();
        info!(
            "Built {}x{} similarity matrix in {:?} ({} zero vectors)",
            n,
            n,
            start.elapsed(),
            zero_rows
        );

        SimilarityMatrix::from_raw(n, values)
    }
}

impl Default for SimilarityBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn fill_row(i: usize, row: &mut [f32], vectors: &[FeatureVector], norms: &[f64]) {
    let a = &vectors[i];
    for (j, slot) in row.iter_mut().enumerate() {
        *slot = if i == j {
            if norms[i] == 0.0 { 0.0 } else { 1.0 }
        } else {
            let denominator = norms[i] * norms[j];
            if denominator == 0.0 {
                0.0
            } else {
                ((a.dot(&vectors[j]) as f64 / denominator) as f32).clamp(0.0, 1.0)
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(len: usize, counts: &[(u32, u32)]) -> FeatureVector {
        FeatureVector::from_counts(len, counts.iter().copied())
    }

    fn create_test_vectors() -> Vec<FeatureVector> {
        vec![
            vector(5, &[(0, 1), (1, 1), (2, 1)]),
            vector(5, &[(0, 1), (2, 1), (3, 1)]),
            vector(5, &[(4, 3)]),
            vector(5, &[]),
        ]
    }

    #[test]
    fn test_cosine_similarity() {
        let v = create_test_vectors();
        assert!((cosine_similarity(&v[0], &v[1]) - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&v[0], &v[2]), 0.0);
        assert_eq!(cosine_similarity(&v[0], &v[3]), 0.0);
    }

    #[test]
    fn test_matrix_is_symmetric_with_fixed_diagonal() {
        let vectors = create_test_vectors();
        let m = SimilarityBuilder::new().with_rows_per_task(1).build(&vectors).unwrap();

        assert_eq!(m.dim(), 4);
        for i in 0..4 {
            for j in 0..4 {
                let value = m.get(i, j).unwrap();
                assert_eq!(value, m.get(j, i).unwrap());
                assert!((0.0..=1.0).contains(&value));
            }
        }
        assert_eq!(m.get(0, 0), Some(1.0));
        assert_eq!(m.get(2, 2), Some(1.0));
        assert_eq!(m.get(3, 3), Some(0.0));
        assert_eq!(m.row(3).unwrap(), &[0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_chunking_does_not_change_result() {
        let vectors = create_test_vectors();
        let a = SimilarityBuilder::new().with_rows_per_task(1).build(&vectors).unwrap();
        let b = SimilarityBuilder::new().with_rows_per_task(3).build(&vectors).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_width_mismatch() {
        let vectors = vec![vector(3, &[(0, 1)]), vector(4, &[(0, 1)])];
        let err = SimilarityBuilder::new().build(&vectors).unwrap_err();
        assert_eq!(
            err,
            SimilarityError::WidthMismatch {
                row: 1,
                expected: 3,
                found: 4
            }
        );
    }

    #[test]
    fn test_empty_vocabulary() {
        let vectors = vec![FeatureVector::zeros(0), FeatureVector::zeros(0)];
        assert_eq!(
            SimilarityBuilder::new().build(&vectors).unwrap_err(),
            SimilarityError::EmptyVocabulary
        );
    }

    #[test]
    fn test_no_vectors() {
        let m = SimilarityBuilder::new().build(&[]).unwrap();
        assert_eq!(m.dim(), 0);
    }
}
