//! Core traits for the feature pipeline.
//!
//! - `Lemmatizer` lets the rule set be swapped without touching the
//!   pipeline
//! - `Reporter` is the reporting interface handed to every stage, so a
//!   build can decide where per-item problems go

use crate::error::{PipelineError, Result};
use data_loader::ItemId;
use std::fmt;

/// Reduces a single word to its base lexical form.
///
/// ## Design Note
/// - `Send + Sync` allows one lemmatizer to be shared by rayon workers
/// - Input words are already lowercased and purely alphanumeric
pub trait Lemmatizer: Send + Sync {
    /// Returns the name of this lemmatizer (for logging/debugging)
    fn name(&self) -> &str;

    /// Lemmatize one word.
    ///
    /// # Returns
    /// * `Ok(String)` - The base form (may equal the input)
    /// * `Err` - If this word cannot be handled; the whole item then
    ///   falls back to an empty lemmatized string
    fn lemmatize(&self, word: &str) -> Result<String>;
}

/// Pipeline stage a report comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Normalize,
    Lemmatize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Normalize => write!(f, "normalize"),
            Stage::Lemmatize => write!(f, "lemmatize"),
        }
    }
}

/// Receives recoverable per-item problems from pipeline stages.
///
/// Stages never log these through a global logger themselves; they hand
/// them to whichever reporter the caller injected.
pub trait Reporter: Send + Sync {
    fn report(&self, stage: Stage, item_id: ItemId, error: &PipelineError);
}
