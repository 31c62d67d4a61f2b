//! The FeaturePipeline chains every stage from raw items to vectors.
//!
//! normalize → compose tags → lemmatize → vectorize

use crate::error::Result;
use crate::features::FeatureVector;
use crate::lemmatizer::{lemmatize_documents, EnglishLemmatizer};
use crate::normalizer::TextNormalizer;
use crate::tags::{TagComposer, TagDocument};
use crate::traits::{Lemmatizer, Reporter};
use crate::vectorizer::{CountVectorizer, VectorizerConfig};
use data_loader::{Item, ItemId};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Everything the pipeline produced for one corpus, in corpus order.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub documents: Vec<TagDocument>,
    /// Lemmatized tag strings; `""` for items whose lemmatization failed
    pub lemmatized: Vec<String>,
    pub vectorizer: CountVectorizer,
    pub vectors: Vec<FeatureVector>,
}

/// Runs the feature stages over a corpus.
///
/// ## Usage
/// ```ignore
/// let pipeline = FeaturePipeline::new()
///     .with_vectorizer_config(VectorizerConfig::new().with_max_features(5000))
///     .with_lemmatizer(Arc::new(EnglishLemmatizer::new()));
///
/// let output = pipeline.run(corpus.items(), None, &TracingReporter)?;
/// ```
pub struct FeaturePipeline {
    normalizer: TextNormalizer,
    composer: TagComposer,
    lemmatizer: Arc<dyn Lemmatizer>,
    vectorizer_config: VectorizerConfig,
}

impl FeaturePipeline {
    pub fn new() -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            composer: TagComposer,
            lemmatizer: Arc::new(EnglishLemmatizer::new()),
            vectorizer_config: VectorizerConfig::default(),
        }
    }

    pub fn with_lemmatizer(mut self, lemmatizer: Arc<dyn Lemmatizer>) -> Self {
        self.lemmatizer = lemmatizer;
        self
    }

    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Configuration used when a new vocabulary has to be fitted
    pub fn with_vectorizer_config(mut self, config: VectorizerConfig) -> Self {
        self.vectorizer_config = config;
        self
    }

    /// Run every stage over `items`.
    ///
    /// ## Algorithm
    /// 1. Normalize each item's fields into token lists (parallel)
    /// 2. Compose tag documents
    /// 3. Lemmatize each document (parallel)
    /// 4. Fit a vectorizer, or reuse `reuse` when given, and project
    ///
    /// Per-item problems go to `reporter` and never abort the run.
    ///
    /// # Returns
    /// * `Ok(PipelineOutput)` - One entry per item in every vector
    /// * `Err` - Only corpus-level failures (empty vocabulary, bad config)
    #[instrument(skip_all, fields(items = items.len(), reuse = reuse.is_some()))]
    pub fn run(
        &self,
        items: &[Item],
        reuse: Option<CountVectorizer>,
        reporter: &dyn Reporter,
    ) -> Result<PipelineOutput> {
        let fields = self.normalizer.normalize_all(items, reporter);
        debug!(
            "Normalized {} items ({} tokens)",
            fields.len(),
            fields.iter().map(|f| f.token_count()).sum::<usize>()
        );

        let documents = self.composer.compose_all(fields);
        let empty = documents.iter().filter(|d| d.is_empty()).count();
        debug!("Composed {} tag documents ({} empty)", documents.len(), empty);

        let ids: Vec<ItemId> = items.iter().map(|item| item.id).collect();
        let lemmatized = lemmatize_documents(self.lemmatizer.as_ref(), &ids, &documents, reporter);
        debug!(
            "Lemmatized {} documents with {}",
            lemmatized.len(),
            self.lemmatizer.name()
        );

        let (vectorizer, vectors) = match reuse {
            Some(vectorizer) => {
                debug!("Reusing vocabulary of {} terms", vectorizer.len());
                let vectors = vectorizer.transform_all(&lemmatized)?;
                (vectorizer, vectors)
            }
            None => CountVectorizer::fit_transform(&lemmatized, self.vectorizer_config.clone())?,
        };
        debug!(
            "Vectorized {} items into {} columns",
            vectors.len(),
            vectorizer.len()
        );

        Ok(PipelineOutput {
            documents,
            lemmatized,
            vectorizer,
            vectors,
        })
    }
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::new()
    }
}
