//! Error types for the feature pipeline.
//!
//! Two kinds of failure live here:
//! - per-item problems (`MalformedField`, `Lemmatization`) which the
//!   pipeline recovers from and only reports
//! - corpus-level problems (`EmptyVocabulary`, bad configuration) which
//!   abort the build

use crate::normalizer::FieldKind;
use data_loader::ItemId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// A metadata field could not be read as a list of named entities.
    /// Recovered by treating the field as empty.
    #[error("Malformed {field} field on item {item_id}: {reason}")]
    MalformedField {
        item_id: ItemId,
        field: FieldKind,
        reason: String,
    },

    /// Lemmatization of one item failed. Recovered by using an empty
    /// lemmatized string for that item.
    #[error("Lemmatization failed: {0}")]
    Lemmatization(String),

    /// No term survived analysis and stop-word removal, so no vocabulary
    /// (and no similarity matrix) can be built.
    #[error("Empty vocabulary: {documents} documents contain no terms after stop-word removal")]
    EmptyVocabulary { documents: usize },

    #[error("Unknown stop-word language: {0}")]
    UnknownStopWordLanguage(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, PipelineError>;
