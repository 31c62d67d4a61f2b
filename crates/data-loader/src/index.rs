//! Corpus loading and title lookup.
//!
//! - `Corpus::load_from_file` is the entry point used by the batch build
//! - `TitleIndex` maps lowercased titles to corpus rows for queries

use crate::error::Result;
use crate::parser;
use crate::types::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

impl Corpus {
    /// Load a JSON-lines corpus from disk
    ///
    /// Bad records are skipped and kept in `skipped()`; only I/O
    /// failures return an error.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading corpus from {:?}", path);

        let corpus = parser::parse_corpus(path)?;

        if !corpus.skipped.is_empty() {
            warn!(
                "Skipped {} malformed records while loading {:?}",
                corpus.skipped.len(),
                path
            );
        }
        info!("Loaded {} items", corpus.items.len());
        Ok(corpus)
    }

    /// Build a title index over the items in corpus order
    pub fn title_index(&self) -> TitleIndex {
        TitleIndex::build(self.items.iter().map(|item| item.title.as_str()))
    }
}

/// Case-insensitive exact-title lookup.
///
/// When several rows share a lowercased title, the first row by corpus
/// index wins.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    rows: HashMap<String, usize>,
    duplicates: usize,
}

impl TitleIndex {
    pub fn build<'a>(titles: impl IntoIterator<Item = &'a str>) -> Self {
        let mut index = TitleIndex::default();
        for (row, title) in titles.into_iter().enumerate() {
            let key = title.to_lowercase();
            if index.rows.contains_key(&key) {
                index.duplicates += 1;
            } else {
                index.rows.insert(key, row);
            }
        }
        index
    }

    /// Row of the first item whose lowercased title equals `title` lowercased
    pub fn lookup(&self, title: &str) -> Option<usize> {
        self.rows.get(&title.to_lowercase()).copied()
    }

    /// Number of rows shadowed by an earlier row with the same title
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_title_index_first_row_wins() {
        let index = TitleIndex::build(["Heat", "Alien", "heat", "HEAT"]);
        assert_eq!(index.lookup("heat"), Some(0));
        assert_eq!(index.lookup("ALIEN"), Some(1));
        assert_eq!(index.duplicates(), 2);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_title_index_is_exact() {
        let index = TitleIndex::build(["The Matrix"]);
        assert_eq!(index.lookup("the matrix"), Some(0));
        assert_eq!(index.lookup("matrix"), None);
        assert_eq!(index.lookup(" the matrix"), None);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id": 1, "title": "Avatar"}}"#).unwrap();
        writeln!(file, r#"{{"id": 2, "title": "Avatar"}}"#).unwrap();
        writeln!(file, "{{broken").unwrap();

        let corpus = Corpus::load_from_file(file.path()).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.skipped().len(), 1);
        assert_eq!(corpus.title_index().lookup("avatar"), Some(0));
    }

    #[test]
    fn test_missing_file() {
        let result = Corpus::load_from_file(Path::new("does/not/exist.jsonl"));
        assert!(matches!(
            result,
            Err(crate::DataLoadError::FileNotFound { .. })
        ));
    }
}
