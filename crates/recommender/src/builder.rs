//! # Batch Engine Builder
//!
//! Coordinates an offline build:
//! 1. Load the corpus
//! 2. Run the feature pipeline (fit a vocabulary or reuse the saved one)
//! 3. Build the similarity matrix
//! 4. Stamp everything with a fresh snapshot id and save it
//!
//! Per-item problems are collected and counted in the `BuildSummary`;
//! only corpus-level failures abort the build.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{info, warn};
use ulid::Ulid;

use data_loader::Corpus;
use pipeline::{
    CollectingReporter, CountVectorizer, EnglishLemmatizer, FeaturePipeline, Stage,
};
use similarity::SimilarityBuilder;

use crate::artifacts::{ArtifactSet, ArtifactStore, ItemRecord};
use crate::config::EngineConfig;

/// What a build did, for logging and the CLI
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub snapshot_id: Ulid,
    pub items: usize,
    pub vocabulary: usize,
    pub reused_vocabulary: bool,
    /// A reused vectorizer was fitted with settings other than the
    /// configured ones, which had no effect
    pub ignored_vectorizer_config: bool,
    /// Corpus lines that could not be parsed
    pub skipped_records: usize,
    /// Recovered per-item problems by stage
    pub issues: HashMap<Stage, usize>,
    pub elapsed: Duration,
}

/// Runs the offline pipeline for one corpus snapshot
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn feature_pipeline(&self) -> FeaturePipeline {
        let lemmatizer =
            EnglishLemmatizer::new().with_verb_rules(self.config.lemmatizer.lemmatize_verbs);
        FeaturePipeline::new()
            .with_lemmatizer(Arc::new(lemmatizer))
            .with_vectorizer_config(self.config.vectorizer.clone())
    }

    /// Build artifacts for an in-memory corpus.
    ///
    /// # Arguments
    /// * `corpus` - The loaded items, in row order
    /// * `reuse` - A previously fitted vectorizer; `None` fits a new one
    ///
    /// # Returns
    /// The artifact set and a summary; nothing is written to disk
    pub fn build(
        &self,
        corpus: &Corpus,
        reuse: Option<CountVectorizer>,
    ) -> Result<(ArtifactSet, BuildSummary)> {
        let start_time = Instant::now();
        let reused_vocabulary = reuse.is_some();
        let ignored_vectorizer_config = reuse
            .as_ref()
            .is_some_and(|vectorizer| vectorizer.config() != &self.config.vectorizer);
        if ignored_vectorizer_config {
            warn!(
                "Reused vocabulary was fitted with {:?}; configured {:?} is ignored until a refit",
                reuse.as_ref().map(|v| v.config()),
                self.config.vectorizer
            );
        }
        let reporter = CollectingReporter::forwarding();

        let output = self
            .feature_pipeline()
            .run(corpus.items(), reuse, &reporter)
            .context("Feature pipeline failed")?;
        info!(
            "Vectorized {} items over {} terms",
            output.vectors.len(),
            output.vectorizer.len()
        );

        let matrix = SimilarityBuilder::new()
            .build(&output.vectors)
            .context("Failed to build similarity matrix")?;

        let items: Vec<ItemRecord> = corpus
            .items()
            .iter()
            .zip(output.lemmatized)
            .map(|(item, tags)| ItemRecord {
                id: item.id,
                title: item.title.clone(),
                tags,
            })
            .collect();

        let issues = reporter.counts_by_stage();
        if !reporter.is_empty() {
            warn!("{} item-level issues were recovered during the build", reporter.len());
        }

        let snapshot_id = Ulid::new();
        let summary = BuildSummary {
            snapshot_id,
            items: items.len(),
            vocabulary: output.vectorizer.len(),
            reused_vocabulary,
            ignored_vectorizer_config,
            skipped_records: corpus.skipped().len(),
            issues,
            elapsed: start_time.elapsed(),
        };
        info!(
            "Built snapshot {} for {} items in {:.2?}",
            snapshot_id,
            summary.items,
            summary.elapsed
        );

        let set = ArtifactSet {
            snapshot_id,
            vectorizer: output.vectorizer,
            items,
            matrix,
        };
        Ok((set, summary))
    }

    /// Load a corpus file, build, and write the artifacts to `store`.
    ///
    /// A vectorizer already in `store` is reused unless `refit` is set.
    /// All three artifacts are rewritten under a new snapshot id either way.
    pub fn build_and_save(
        &self,
        corpus_path: &Path,
        store: &ArtifactStore,
        refit: bool,
    ) -> Result<BuildSummary> {
        let corpus = Corpus::load_from_file(corpus_path)
            .with_context(|| format!("Failed to load corpus from {}", corpus_path.display()))?;

        let reuse = if !refit && store.has_vectorizer() {
            let vectorizer = store
                .load_vectorizer()
                .context("Failed to load saved vectorizer")?;
            info!(
                "Reusing saved vocabulary of {} terms from {:?}",
                vectorizer.len(),
                store.dir()
            );
            Some(vectorizer)
        } else {
            None
        };

        let (set, summary) = self.build(&corpus, reuse)?;
        store.save(&set).context("Failed to save artifacts")?;
        Ok(summary)
    }
}
