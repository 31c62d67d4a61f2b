//! Tag Composer: one flat token sequence ("tag document") per item.

use crate::normalizer::NormalizedFields;
use serde::{Deserialize, Serialize};

/// Tokens of one item in the fixed order
/// overview, genres, keywords, cast, crew.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDocument {
    tokens: Vec<String>,
}

impl TagDocument {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens joined by single spaces, the lemmatizer's input
    pub fn to_text(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Concatenates normalized fields into tag documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagComposer;

impl TagComposer {
    pub fn compose(&self, fields: NormalizedFields) -> TagDocument {
        let NormalizedFields {
            overview,
            genres,
            keywords,
            cast,
            crew,
        } = fields;

        let mut tokens = overview;
        tokens.reserve(genres.len() + keywords.len() + cast.len() + crew.len());
        tokens.extend(genres);
        tokens.extend(keywords);
        tokens.extend(cast);
        tokens.extend(crew);
        TagDocument::new(tokens)
    }

    pub fn compose_all(&self, fields: Vec<NormalizedFields>) -> Vec<TagDocument> {
        fields.into_iter().map(|f| self.compose(f)).collect()
    }
}
