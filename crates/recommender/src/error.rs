//! Error types for the recommender crate.
//!
//! Artifact errors are fatal: a recommender is never served from a
//! partial or mismatched artifact set.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Artifact I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} is not a similarity matrix file")]
    BadMagic { path: String },

    #[error("{path} has unsupported format version {found} (expected {expected})")]
    UnsupportedVersion {
        path: String,
        found: u32,
        expected: u32,
    },

    /// The artifacts do not belong to the same build
    #[error("Artifact mismatch: {0}")]
    Mismatch(String),
}
