//! Vocabulary Vectorizer: term-count projection over a frozen vocabulary.
//!
//! ## Modes
//! - **Fit**: `CountVectorizer::fit` picks up to `max_features` terms by
//!   corpus-wide frequency and freezes them as the `Vocabulary`
//! - **Reuse**: `transform` / `transform_all` project text against a
//!   vocabulary fitted earlier (possibly loaded from disk)
//!
//! Fit and transform share one analyzer, so a term is counted the same
//! way at build time and at query time.

use crate::error::{PipelineError, Result};
use crate::features::FeatureVector;
use crate::stop_words::StopWords;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

/// Default vocabulary cap
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// Default minimum token length kept by the analyzer
pub const DEFAULT_MIN_TOKEN_CHARS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    pub max_features: usize,
    pub stop_words: StopWords,
    pub min_token_chars: usize,
}

impl VectorizerConfig {
    pub fn new() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            stop_words: StopWords::default(),
            min_token_chars: DEFAULT_MIN_TOKEN_CHARS,
        }
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = stop_words;
        self
    }

    pub fn with_min_token_chars(mut self, chars: usize) -> Self {
        self.min_token_chars = chars;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_features == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_features must be positive".to_string(),
            ));
        }
        if self.min_token_chars == 0 {
            return Err(PipelineError::InvalidConfig(
                "min_token_chars must be positive".to_string(),
            ));
        }
        self.stop_words.resolve().map(|_| ())
    }
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Frozen term → column mapping.
///
/// Serialized as the ordered term list; the lookup map is rebuilt on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, u32>,
}

impl Vocabulary {
    /// Column index is the position in `terms`
    pub fn from_terms(terms: Vec<String>) -> Self {
        let index = terms
            .iter()
            .enumerate()
            .map(|(col, term)| (term.clone(), col as u32))
            .collect();
        Self { terms, index }
    }

    pub fn column(&self, term: &str) -> Option<u32> {
        self.index.get(term).copied()
    }

    pub fn term(&self, column: usize) -> Option<&str> {
        self.terms.get(column).map(String::as_str)
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl From<Vec<String>> for Vocabulary {
    fn from(terms: Vec<String>) -> Self {
        Self::from_terms(terms)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.terms
    }
}

/// Tokenizer and stop-word filter shared by fit and transform
#[derive(Debug, Clone)]
struct Analyzer {
    stop_words: HashSet<String>,
    min_token_chars: usize,
}

impl Analyzer {
    fn from_config(config: &VectorizerConfig) -> Result<Self> {
        Ok(Self {
            stop_words: config.stop_words.resolve()?,
            min_token_chars: config.min_token_chars,
        })
    }

    /// Lowercase, split on anything that is not alphanumeric or `_`,
    /// drop short tokens and stop words
    fn terms(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|t| t.chars().count() >= self.min_token_chars)
            .filter(|t| !self.stop_words.contains(*t))
            .map(str::to_string)
            .collect()
    }
}

/// The persisted vectorizer: its configuration plus the fitted vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountVectorizer {
    config: VectorizerConfig,
    vocabulary: Vocabulary,
}

impl CountVectorizer {
    /// Fit a vocabulary on `documents`.
    ///
    /// ## Algorithm
    /// 1. Count every analyzed term across all documents, remembering the
    ///    position at which each term was first seen
    /// 2. Sort by (count desc, first encounter asc)
    /// 3. Keep the first `max_features`; column index = rank
    ///
    /// # Returns
    /// * `Ok(CountVectorizer)` - The frozen vectorizer
    /// * `Err(EmptyVocabulary)` - No term survived analysis
    /// * `Err(InvalidConfig)` - Bad `config`
    #[instrument(skip(documents, config), fields(documents = documents.len()))]
    pub fn fit(documents: &[String], config: VectorizerConfig) -> Result<Self> {
        config.validate()?;
        let analyzer = Analyzer::from_config(&config)?;

        // term -> (count, first encounter)
        let mut counts: HashMap<String, (u64, usize)> = HashMap::new();
        let mut seen = 0usize;
        for document in documents {
            for term in analyzer.terms(document) {
                let entry = counts.entry(term).or_insert((0, seen));
                entry.0 += 1;
                seen += 1;
            }
        }

        if counts.is_empty() {
            return Err(PipelineError::EmptyVocabulary {
                documents: documents.len(),
            });
        }

        let distinct = counts.len();
        let mut ranked: Vec<(String, u64, usize)> = counts
            .into_iter()
            .map(|(term, (count, first))| (term, count, first))
            .collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        ranked.truncate(config.max_features);

        let vocabulary =
            Vocabulary::from_terms(ranked.into_iter().map(|(term, _, _)| term).collect());

        info!(
            "Fitted vocabulary: {} terms kept out of {} distinct (max_features={})",
            vocabulary.len(),
            distinct,
            config.max_features
        );

        Ok(Self { config, vocabulary })
    }

    /// Fit on `documents` and project the same documents
    pub fn fit_transform(
        documents: &[String],
        config: VectorizerConfig,
    ) -> Result<(Self, Vec<FeatureVector>)> {
        let vectorizer = Self::fit(documents, config)?;
        let vectors = vectorizer.transform_all(documents)?;
        Ok((vectorizer, vectors))
    }

    /// Project one text; out-of-vocabulary terms are ignored.
    pub fn transform(&self, text: &str) -> Result<FeatureVector> {
        let analyzer = Analyzer::from_config(&self.config)?;
        Ok(self.project(&analyzer, text))
    }

    /// Project every document in parallel. Output order matches input.
    pub fn transform_all(&self, documents: &[String]) -> Result<Vec<FeatureVector>> {
        let analyzer = Analyzer::from_config(&self.config)?;
        let vectors: Vec<FeatureVector> = documents
            .par_iter()
            .map(|document| self.project(&analyzer, document))
            .collect();
        debug!(
            "Vectorized {} documents against {} columns",
            vectors.len(),
            self.vocabulary.len()
        );
        Ok(vectors)
    }

    fn project(&self, analyzer: &Analyzer, text: &str) -> FeatureVector {
        let columns = analyzer
            .terms(text)
            .into_iter()
            .filter_map(|term| self.vocabulary.column(&term))
            .map(|col| (col, 1));
        FeatureVector::from_counts(self.vocabulary.len(), columns)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Vector width
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    fn no_stop_words(max_features: usize) -> VectorizerConfig {
        VectorizerConfig::new()
            .with_max_features(max_features)
            .with_stop_words(StopWords::none())
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let corpus = docs(&[
            "action hero",
            "action villain",
            "action chase",
            "action car",
            "action city",
            "food",
        ]);

        let vectorizer = CountVectorizer::fit(&corpus, no_stop_words(2)).unwrap();
        assert_eq!(vectorizer.len(), 2);
        assert_eq!(vectorizer.vocabulary().term(0), Some("action"));
        // All other terms appear once; first encountered wins
        assert_eq!(vectorizer.vocabulary().term(1), Some("hero"));
        assert_eq!(vectorizer.vocabulary().column("food"), None);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let corpus = docs(&[
            "space adventure action",
            "space opera action",
            "cooking recipe food",
        ]);
        let a = CountVectorizer::fit(&corpus, VectorizerConfig::default()).unwrap();
        let b = CountVectorizer::fit(&corpus, VectorizerConfig::default()).unwrap();

        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
        assert_eq!(a.transform_all(&corpus).unwrap(), b.transform_all(&corpus).unwrap());
    }

    #[test]
    fn test_vector_length_equals_vocabulary_size() {
        let corpus = docs(&["alpha beta beta", "gamma", ""]);
        let (vectorizer, vectors) =
            CountVectorizer::fit_transform(&corpus, no_stop_words(10)).unwrap();
        assert_eq!(vectorizer.len(), 3);
        for v in &vectors {
            assert_eq!(v.len(), 3);
        }
        let beta = vectorizer.vocabulary().column("beta").unwrap() as usize;
        assert_eq!(beta, 0);
        assert_eq!(vectors[0].get(beta), 2);
        assert!(vectors[2].is_zero());
    }

    #[test]
    fn test_transform_ignores_unknown_terms() {
        let corpus = docs(&["space opera", "space western"]);
        let vectorizer = CountVectorizer::fit(&corpus, no_stop_words(10)).unwrap();
        let v = vectorizer.transform("space cowboy opera").unwrap();
        assert_eq!(v.len(), 3);
        assert_eq!(v.nnz(), 2);
    }

    #[test]
    fn test_analyzer_rules() {
        let corpus = docs(&["The a x hero's_journey, HERO!"]);
        let vectorizer = CountVectorizer::fit(&corpus, VectorizerConfig::default()).unwrap();
        let terms = vectorizer.vocabulary().terms();
        // "the"/"a" are stop words, "x" is too short
        assert_eq!(terms, &["hero".to_string(), "s_journey".to_string()]);
    }

    #[test]
    fn test_empty_vocabulary() {
        let corpus = docs(&["the and of", ""]);
        let err = CountVectorizer::fit(&corpus, VectorizerConfig::default()).unwrap_err();
        assert_eq!(err, PipelineError::EmptyVocabulary { documents: 2 });
    }

    #[test]
    fn test_zero_max_features_is_invalid() {
        let err = CountVectorizer::fit(&docs(&["a b"]), no_stop_words(0)).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
    }

    #[test]
    fn test_vocabulary_serializes_as_term_list() {
        let vocabulary = Vocabulary::from_terms(vec!["b".into(), "a".into()]);
        let json = serde_json::to_string(&vocabulary).unwrap();
        assert_eq!(json, r#"["b","a"]"#);
        let back: Vocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.column("a"), Some(1));
    }
}
