//! Recommender crate: batch build, persisted artifacts, and queries.
//!
//! This crate ties the workspace together. `EngineBuilder` runs the
//! offline build from a corpus file to a saved `ArtifactSet`;
//! `Recommender` serves ranked lookups from a loaded set.
//!
//! ## Example Usage
//! ```ignore
//! use recommender::{ArtifactStore, EngineBuilder, EngineConfig, Recommender};
//!
//! let config = EngineConfig::load_or_default(None)?;
//! let store = ArtifactStore::new(&config.paths.artifacts_dir);
//!
//! EngineBuilder::new(config.clone()).build_and_save(corpus_path, &store, false)?;
//!
//! let recommender = Recommender::load(&store)?;
//! for rec in recommender.recommend("Avatar", config.recommend.top_n_recommendations) {
//!     println!("{} ({:.3})", rec.title, rec.score);
//! }
//! ```

pub mod artifacts;
pub mod builder;
pub mod config;
pub mod error;
pub mod recommender;

pub use artifacts::{ArtifactSet, ArtifactStore, ItemRecord};
pub use builder::{BuildSummary, EngineBuilder};
pub use config::EngineConfig;
pub use error::{ArtifactError, ConfigError};
pub use recommender::{Recommendation, Recommender, SearchHit};
