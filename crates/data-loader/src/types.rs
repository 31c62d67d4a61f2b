//! Core domain types for the movie metadata corpus.
//!
//! These are the strongly-typed records the rest of the workspace sees.
//! Everything that could be loosely typed in the raw dump (stringified
//! lists, missing columns) is resolved into these types by the parser.

use serde::{Deserialize, Serialize};

use crate::error::DataLoadError;

// =============================================================================
// Type Aliases
// =============================================================================

/// Stable identifier of an item (the TMDB movie id in the usual dumps)
pub type ItemId = u32;

// =============================================================================
// Named entities
// =============================================================================

/// One element of a list-valued metadata field: a genre, keyword,
/// cast member or crew member.
///
/// Raw records carry more attributes (`id`, `character`, `department`, ...);
/// only the two the engine uses are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    #[serde(default)]
    pub name: Option<String>,
    /// Crew role, e.g. `"Director"`. Absent for genres, keywords and cast.
    #[serde(default)]
    pub job: Option<String>,
}

impl NamedEntity {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            job: None,
        }
    }

    pub fn crew(name: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            job: Some(job.into()),
        }
    }
}

/// A list-of-entities field after typed deserialization.
///
/// `Malformed` keeps the reason so the pipeline can report it; the field
/// still contributes no tokens rather than failing the item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EntityField {
    Entities(Vec<NamedEntity>),
    #[default]
    Missing,
    Malformed { reason: String },
}

impl EntityField {
    pub fn entities(&self) -> Option<&[NamedEntity]> {
        match self {
            EntityField::Entities(list) => Some(list.as_slice()),
            _ => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, EntityField::Malformed { .. })
    }
}

impl From<Vec<NamedEntity>> for EntityField {
    fn from(list: Vec<NamedEntity>) -> Self {
        EntityField::Entities(list)
    }
}

/// A free-text field after typed deserialization.
///
/// Like `EntityField`, a value of the wrong JSON type is kept as
/// `Malformed` so the pipeline can report it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TextField {
    Text(String),
    #[default]
    Missing,
    Malformed { reason: String },
}

impl TextField {
    pub fn text(&self) -> Option<&str> {
        match self {
            TextField::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, TextField::Malformed { .. })
    }
}

// =============================================================================
// Item
// =============================================================================

/// One recommendable movie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    /// Title as it appears in the source data
    pub title: String,
    pub overview: TextField,
    pub genres: EntityField,
    pub keywords: EntityField,
    pub cast: EntityField,
    pub crew: EntityField,
}

impl Item {
    /// Create an item with only an id and a title; all metadata missing.
    pub fn new(id: ItemId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            overview: TextField::Missing,
            genres: EntityField::Missing,
            keywords: EntityField::Missing,
            cast: EntityField::Missing,
            crew: EntityField::Missing,
        }
    }

    pub fn with_overview(mut self, overview: impl Into<String>) -> Self {
        self.overview = TextField::Text(overview.into());
        self
    }

    pub fn with_genres(mut self, genres: impl Into<EntityField>) -> Self {
        self.genres = genres.into();
        self
    }

    pub fn with_keywords(mut self, keywords: impl Into<EntityField>) -> Self {
        self.keywords = keywords.into();
        self
    }

    pub fn with_cast(mut self, cast: impl Into<EntityField>) -> Self {
        self.cast = cast.into();
        self
    }

    pub fn with_crew(mut self, crew: impl Into<EntityField>) -> Self {
        self.crew = crew.into();
        self
    }

    /// Lowercased title used for case-insensitive lookup
    pub fn title_key(&self) -> String {
        self.title.to_lowercase()
    }
}

// =============================================================================
// Corpus - the loaded snapshot
// =============================================================================

/// The full set of items for one corpus snapshot, in file order.
///
/// Row position (not `ItemId`) is the index used by the vectors and the
/// similarity matrix downstream.
#[derive(Debug, Default)]
pub struct Corpus {
    pub(crate) items: Vec<Item>,
    /// Records that could not be turned into an `Item`
    pub(crate) skipped: Vec<DataLoadError>,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<Item>) -> Self {
        Self {
            items,
            skipped: Vec::new(),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, row: usize) -> Option<&Item> {
        self.items.get(row)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Errors for the records dropped while loading
    pub fn skipped(&self) -> &[DataLoadError] {
        &self.skipped
    }
}
