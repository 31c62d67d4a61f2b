//! # Data Loader Crate
//!
//! This crate is the ingestion boundary of the recommender: it reads a
//! movie metadata corpus and turns every record into a strongly-typed
//! `Item` before the feature pipeline ever sees it.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Item, NamedEntity, EntityField, TextField, Corpus)
//! - **parser**: Parse JSON-lines corpus files into Rust structs
//! - **index**: Corpus loading and case-insensitive title lookup
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::Corpus;
//! use std::path::Path;
//!
//! let corpus = Corpus::load_from_file(Path::new("data/movies.jsonl"))?;
//! let titles = corpus.title_index();
//!
//! if let Some(row) = titles.lookup("avatar") {
//!     println!("{:?}", corpus.get(row));
//! }
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use index::TitleIndex;
pub use types::{
    // Type aliases
    ItemId,
    // Core types
    Corpus,
    EntityField,
    Item,
    NamedEntity,
    TextField,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_creation() {
        let corpus = Corpus::new();
        assert!(corpus.is_empty());
        assert!(corpus.skipped().is_empty());
    }

    #[test]
    fn test_push_item() {
        let mut corpus = Corpus::new();

        let item = Item::new(19995, "Avatar")
            .with_overview("In the 22nd century, a paraplegic Marine is dispatched to Pandora.")
            .with_genres(vec![NamedEntity::named("Action"), NamedEntity::named("Science Fiction")])
            .with_crew(vec![NamedEntity::crew("James Cameron", "Director")]);

        corpus.push(item);

        let retrieved = corpus.get(0).unwrap();
        assert_eq!(retrieved.id, 19995);
        assert_eq!(retrieved.title_key(), "avatar");
        assert_eq!(retrieved.genres.entities().unwrap().len(), 2);
        assert_eq!(retrieved.keywords, EntityField::Missing);
    }

    #[test]
    fn test_empty_queries() {
        let corpus = Corpus::new();

        assert!(corpus.get(0).is_none());
        assert!(corpus.title_index().lookup("avatar").is_none());
    }
}
