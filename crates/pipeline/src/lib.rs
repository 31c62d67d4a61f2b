//! Feature pipeline: from typed movie records to term-count vectors.
//!
//! This crate provides:
//! - TextNormalizer turning raw metadata fields into token lists
//! - TagComposer building one tag document per item
//! - Lemmatizer trait and the rule-based EnglishLemmatizer
//! - CountVectorizer fitting and applying a frozen vocabulary
//! - Reporter trait through which stages hand off per-item problems
//!
//! ## Architecture
//! The pipeline processes a corpus in stages:
//! 1. Normalize overview, genres, keywords, top-3 cast and directors
//! 2. Concatenate them into a tag document
//! 3. Lemmatize the document to base forms
//! 4. Count vocabulary terms into a `FeatureVector`
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FeaturePipeline, TracingReporter, VectorizerConfig};
//!
//! let pipeline = FeaturePipeline::new()
//!     .with_vectorizer_config(VectorizerConfig::new().with_max_features(5000));
//!
//! // Fit a new vocabulary
//! let output = pipeline.run(corpus.items(), None, &TracingReporter)?;
//!
//! // Later: project against the same vocabulary
//! let again = pipeline.run(corpus.items(), Some(output.vectorizer), &TracingReporter)?;
//! ```

pub mod error;
pub mod traits;
pub mod report;
pub mod normalizer;
pub mod tags;
pub mod lemmatizer;
pub mod stop_words;
pub mod features;
pub mod vectorizer;
pub mod feature_pipeline;

// Re-export main types
pub use error::{PipelineError, Result};
pub use traits::{Lemmatizer, Reporter, Stage};
pub use report::{CollectingReporter, Issue, TracingReporter};
pub use normalizer::{FieldKind, NormalizedFields, TextNormalizer};
pub use tags::{TagComposer, TagDocument};
pub use lemmatizer::EnglishLemmatizer;
pub use stop_words::StopWords;
pub use features::FeatureVector;
pub use vectorizer::{CountVectorizer, VectorizerConfig, Vocabulary};
pub use feature_pipeline::{FeaturePipeline, PipelineOutput};
