//! Parser for corpus files.
//!
//! A corpus is a JSON-lines file, one movie per line:
//!
//! ```text
//! {"id": 19995, "title": "Avatar", "overview": "In the 22nd century...",
//!  "genres": [{"id": 28, "name": "Action"}],
//!  "keywords": "[{\"id\": 1463, \"name\": \"culture clash\"}]",
//!  "cast": [...], "crew": [{"name": "James Cameron", "job": "Director"}]}
//! ```
//!
//! List fields may be real JSON arrays or strings holding a JSON array,
//! which is how TMDB CSV exports store them. Both are resolved here into
//! `EntityField`; nothing downstream parses text syntax.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// One line of the corpus before field resolution
#[derive(Debug, Deserialize)]
struct RawRecord {
    id: ItemId,
    title: String,
    #[serde(default)]
    overview: Option<Value>,
    #[serde(default)]
    genres: Option<Value>,
    #[serde(default)]
    keywords: Option<Value>,
    #[serde(default)]
    cast: Option<Value>,
    #[serde(default)]
    crew: Option<Value>,
}

/// Read a file and split it into lines, replacing invalid UTF-8.
///
/// Invalid sequences become U+FFFD. The record still loads and the
/// lemmatizer later reports that item as a malformed encoding.
fn read_lines_lossy(path: &Path) -> Result<Vec<String>> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    let content = String::from_utf8_lossy(&bytes);
    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Parse a JSON-lines corpus file
pub fn parse_corpus(path: &Path) -> Result<Corpus> {
    let lines = read_lines_lossy(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(parse_lines(lines.iter().map(String::as_str), &file_name))
}

/// Parse corpus content already held in memory
pub fn parse_corpus_str(content: &str, file_name: &str) -> Corpus {
    parse_lines(content.lines(), file_name)
}

fn parse_lines<'a>(lines: impl Iterator<Item = &'a str>, file_name: &str) -> Corpus {
    let mut corpus = Corpus::new();

    for (idx, line) in lines.enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue; // Skip empty lines
        }

        match parse_record(line_trimmed) {
            Ok(item) => corpus.items.push(item),
            Err(reason) => {
                let error = DataLoadError::ParseError {
                    file: file_name.to_string(),
                    line: line_no,
                    reason,
                };
                warn!("Skipping record: {}", error);
                corpus.skipped.push(error);
            }
        }
    }

    debug!(
        "Parsed {} items from {} ({} skipped)",
        corpus.items.len(),
        file_name,
        corpus.skipped.len()
    );
    corpus
}

/// Parse one record; the error is the human-readable reason.
fn parse_record(line: &str) -> std::result::Result<Item, String> {
    let raw: RawRecord =
        serde_json::from_str(line).map_err(|e| format!("Invalid record: {}", e))?;

    Ok(Item {
        id: raw.id,
        title: raw.title,
        overview: free_text(raw.overview),
        genres: entity_field(raw.genres),
        keywords: entity_field(raw.keywords),
        cast: entity_field(raw.cast),
        crew: entity_field(raw.crew),
    })
}

/// Resolve the overview. `null` or absent is missing; any other
/// non-string value is malformed.
fn free_text(value: Option<Value>) -> TextField {
    match value {
        None | Some(Value::Null) => TextField::Missing,
        Some(Value::String(text)) => TextField::Text(text),
        Some(other) => TextField::Malformed {
            reason: format!("expected a string, found {}", value_kind(&other)),
        },
    }
}

/// Resolve a list-of-entities field into its typed form
///
/// Examples:
/// - `[{"name": "Action"}]` -> `Entities([Action])`
/// - `"[{\"name\": \"Action\"}]"` -> `Entities([Action])`
/// - `null` / absent / `""` -> `Missing`
/// - `"[{'name': broken"` -> `Malformed`
pub fn entity_field(value: Option<Value>) -> EntityField {
    match value {
        None | Some(Value::Null) => EntityField::Missing,
        Some(array @ Value::Array(_)) => match serde_json::from_value::<Vec<NamedEntity>>(array) {
            Ok(list) => EntityField::Entities(list),
            Err(e) => EntityField::Malformed {
                reason: e.to_string(),
            },
        },
        Some(Value::String(text)) => {
            if text.trim().is_empty() {
                return EntityField::Missing;
            }
            match serde_json::from_str::<Vec<NamedEntity>>(&text) {
                Ok(list) => EntityField::Entities(list),
                Err(e) => EntityField::Malformed {
                    reason: e.to_string(),
                },
            }
        }
        Some(other) => EntityField::Malformed {
            reason: format!("expected a list of entities, found {}", value_kind(&other)),
        },
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_field_from_array() {
        let field = entity_field(Some(json!([
            {"id": 28, "name": "Action"},
            {"id": 878, "name": "Science Fiction"}
        ])));
        let entities = field.entities().unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[1].name.as_deref(), Some("Science Fiction"));
    }

    #[test]
    fn test_entity_field_from_stringified_array() {
        let field = entity_field(Some(json!(
            "[{\"name\": \"James Cameron\", \"job\": \"Director\", \"department\": \"Directing\"}]"
        )));
        let entities = field.entities().unwrap();
        assert_eq!(entities[0], NamedEntity::crew("James Cameron", "Director"));
    }

    #[test]
    fn test_entity_field_missing_and_malformed() {
        assert_eq!(entity_field(None), EntityField::Missing);
        assert_eq!(entity_field(Some(Value::Null)), EntityField::Missing);
        assert_eq!(entity_field(Some(json!(""))), EntityField::Missing);
        assert!(entity_field(Some(json!("[{'name': broken"))).is_malformed());
        assert!(entity_field(Some(json!(42))).is_malformed());
        assert!(entity_field(Some(json!([1, 2, 3]))).is_malformed());
    }

    #[test]
    fn test_entity_without_name_is_kept_as_unnamed() {
        let field = entity_field(Some(json!([{"id": 1}, {"name": "Kept"}])));
        let entities = field.entities().unwrap();
        assert_eq!(entities.len(), 2);
        assert!(entities[0].name.is_none());
    }

    #[test]
    fn test_parse_corpus_skips_bad_lines() {
        let content = r#"{"id": 1, "title": "Avatar", "overview": "A marine on an alien planet."}

not json at all
{"title": "No Id"}
{"id": 2, "title": "Titanic", "genres": [{"name": "Drama"}], "crew": "oops"}"#;

        let corpus = parse_corpus_str(content, "movies.jsonl");
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.skipped().len(), 2);
        assert!(matches!(
            corpus.skipped()[0],
            DataLoadError::ParseError { line: 3, .. }
        ));

        let titanic = corpus.get(1).unwrap();
        assert_eq!(titanic.title, "Titanic");
        assert!(titanic.crew.is_malformed());
        assert_eq!(titanic.cast, EntityField::Missing);
        assert_eq!(titanic.overview, TextField::Missing);
    }

    #[test]
    fn test_non_string_overview_is_malformed() {
        let content = r#"{"id": 7, "title": "X", "overview": 3.5}
{"id": 8, "title": "Y", "overview": ["a", "b"]}
{"id": 9, "title": "Z", "overview": null}"#;
        let corpus = parse_corpus_str(content, "x.jsonl");

        assert_eq!(corpus.len(), 3);
        assert_eq!(
            corpus.get(0).unwrap().overview,
            TextField::Malformed {
                reason: "expected a string, found a number".into()
            }
        );
        assert!(corpus.get(1).unwrap().overview.is_malformed());
        assert_eq!(corpus.get(2).unwrap().overview, TextField::Missing);
    }
}
