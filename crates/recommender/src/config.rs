//! Engine configuration.
//!
//! Layered: built-in defaults, then an optional TOML file, then CLI
//! flags applied by the binary. Every key in the file is optional.
//!
//! ```toml
//! [vectorizer]
//! max_features = 5000
//! stop_words = "english"
//! min_token_chars = 2
//!
//! [lemmatizer]
//! lemmatize_verbs = false
//!
//! [recommend]
//! top_n_recommendations = 5
//!
//! [paths]
//! artifacts_dir = "artifacts"
//! ```

use crate::error::ConfigError;
use pipeline::VectorizerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LemmatizerSettings {
    /// Also reduce verb inflections (-ing, -ed). Off by default: tags are
    /// lemmatized as nouns.
    #[serde(default)]
    pub lemmatize_verbs: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendSettings {
    #[serde(default = "default_top_n")]
    pub top_n_recommendations: usize,
}

fn default_top_n() -> usize {
    5
}

impl Default for RecommendSettings {
    fn default() -> Self {
        Self {
            top_n_recommendations: default_top_n(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSettings {
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            artifacts_dir: default_artifacts_dir(),
        }
    }
}

/// Main engine settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub vectorizer: VectorizerConfig,
    #[serde(default)]
    pub lemmatizer: LemmatizerSettings,
    #[serde(default)]
    pub recommend: RecommendSettings,
    #[serde(default)]
    pub paths: PathSettings,
}

impl EngineConfig {
    /// Read and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Load `path` when given, otherwise fall back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: "<string>".to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no build or query can run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.vectorizer
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.recommend.top_n_recommendations == 0 {
            return Err(ConfigError::Invalid(
                "top_n_recommendations must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
