//! Text Normalizer: turns one item's raw fields into token lists.
//!
//! ## Rules
//! - genres / keywords: every entity's `name`
//! - cast: the first 3 entities only, then their names
//! - crew: only entities whose `job` is exactly `"Director"`
//! - overview: whitespace-separated words, punctuation left alone
//!
//! Names coming from entity fields lose their inner whitespace so that
//! `"Science Fiction"` stays one token (`"ScienceFiction"`).

use crate::traits::{Reporter, Stage};
use crate::error::PipelineError;
use data_loader::{EntityField, Item, NamedEntity, TextField};
use rayon::prelude::*;
use std::fmt;
use tracing::debug;

/// Number of leading cast members kept per item
pub const DEFAULT_CAST_LIMIT: usize = 3;

/// Crew `job` value that is kept (case-sensitive)
pub const DIRECTOR_JOB: &str = "Director";

/// The metadata fields a tag document is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Overview,
    Genres,
    Keywords,
    Cast,
    Crew,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Overview => "overview",
            FieldKind::Genres => "genres",
            FieldKind::Keywords => "keywords",
            FieldKind::Cast => "cast",
            FieldKind::Crew => "crew",
        };
        f.write_str(name)
    }
}

/// Per-field tokens of one item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedFields {
    pub overview: Vec<String>,
    pub genres: Vec<String>,
    pub keywords: Vec<String>,
    pub cast: Vec<String>,
    pub crew: Vec<String>,
}

impl NormalizedFields {
    pub fn token_count(&self) -> usize {
        self.overview.len()
            + self.genres.len()
            + self.keywords.len()
            + self.cast.len()
            + self.crew.len()
    }
}

#[derive(Debug, Clone)]
pub struct TextNormalizer {
    cast_limit: usize,
}

impl TextNormalizer {
    pub fn new() -> Self {
        Self {
            cast_limit: DEFAULT_CAST_LIMIT,
        }
    }

    /// Configure how many leading cast members are kept (default: 3)
    pub fn with_cast_limit(mut self, limit: usize) -> Self {
        self.cast_limit = limit;
        self
    }

    /// Normalize every item, in parallel. Output order matches `items`.
    pub fn normalize_all(&self, items: &[Item], reporter: &dyn Reporter) -> Vec<NormalizedFields> {
        items
            .par_iter()
            .map(|item| self.normalize(item, reporter))
            .collect()
    }

    /// Normalize a single item.
    ///
    /// Malformed fields are reported and contribute no tokens.
    pub fn normalize(&self, item: &Item, reporter: &dyn Reporter) -> NormalizedFields {
        let overview = match &item.overview {
            TextField::Text(text) => tokenize_overview(text),
            TextField::Missing => Vec::new(),
            TextField::Malformed { reason } => {
                report_malformed(item, FieldKind::Overview, reason, reporter);
                Vec::new()
            }
        };

        NormalizedFields {
            overview,
            genres: field_tokens(item, FieldKind::Genres, &item.genres, reporter, entity_names),
            keywords: field_tokens(item, FieldKind::Keywords, &item.keywords, reporter, entity_names),
            cast: field_tokens(item, FieldKind::Cast, &item.cast, reporter, |entities| {
                cast_names(entities, self.cast_limit)
            }),
            crew: field_tokens(item, FieldKind::Crew, &item.crew, reporter, director_names),
        }
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn field_tokens(
    item: &Item,
    kind: FieldKind,
    field: &EntityField,
    reporter: &dyn Reporter,
    extract: impl Fn(&[NamedEntity]) -> Vec<String>,
) -> Vec<String> {
    match field {
        EntityField::Entities(entities) => extract(entities)
            .into_iter()
            .map(|name| squash_whitespace(&name))
            .filter(|token| !token.is_empty())
            .collect(),
        EntityField::Missing => Vec::new(),
        EntityField::Malformed { reason } => {
            report_malformed(item, kind, reason, reporter);
            Vec::new()
        }
    }
}

fn report_malformed(item: &Item, field: FieldKind, reason: &str, reporter: &dyn Reporter) {
    let error = PipelineError::MalformedField {
        item_id: item.id,
        field,
        reason: reason.to_string(),
    };
    reporter.report(Stage::Normalize, item.id, &error);
}

/// Split free text on whitespace
pub fn tokenize_overview(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Names of all entities that have one
pub fn entity_names(entities: &[NamedEntity]) -> Vec<String> {
    entities
        .iter()
        .filter_map(|entity| entity.name.clone())
        .collect()
}

/// Names among the first `limit` entities
///
/// Truncation happens before name extraction, so an unnamed entity in the
/// first `limit` positions is not replaced by a later one.
pub fn cast_names(entities: &[NamedEntity], limit: usize) -> Vec<String> {
    let end = entities.len().min(limit);
    entity_names(&entities[..end])
}

/// Names of crew members whose job is exactly `"Director"`
pub fn director_names(entities: &[NamedEntity]) -> Vec<String> {
    let directors: Vec<String> = entities
        .iter()
        .filter(|person| person.job.as_deref() == Some(DIRECTOR_JOB))
        .filter_map(|person| person.name.clone())
        .collect();
    debug!("Extracted {} directors from {} crew entries", directors.len(), entities.len());
    directors
}

/// Remove all whitespace inside a name: `"Sam Worthington"` -> `"SamWorthington"`
pub fn squash_whitespace(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}
