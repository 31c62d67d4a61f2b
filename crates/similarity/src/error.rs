//! Error types for the similarity crate.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimilarityError {
    /// Two feature vectors were fitted against different vocabularies
    #[error("Vector width mismatch: row {row} has width {found}, expected {expected}")]
    WidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Vectors of width 0 cannot be compared
    #[error("Cannot build a similarity matrix from an empty vocabulary")]
    EmptyVocabulary,

    /// Raw matrix data does not hold `dim * dim` values
    #[error("Matrix of dimension {dim} needs {expected} values, found {found}")]
    DimensionMismatch {
        dim: usize,
        expected: usize,
        found: usize,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, SimilarityError>;
