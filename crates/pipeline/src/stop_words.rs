//! Stop-word configuration for the vectorizer.
//!
//! `StopWords` is either a language tag or an explicit term list. The
//! only built-in language is `"english"`, the classic 318-word
//! count-vectorizer list; `"none"` turns removal off.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Built-in English stop words
pub const ENGLISH: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
    "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
    "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together",
    "too", "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up",
    "upon", "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when",
    "whence", "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon",
    "wherever", "whether", "which", "while", "whither", "who", "whoever", "whole", "whom",
    "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your", "yours",
    "yourself", "yourselves",
];

/// Which terms the vectorizer drops before counting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopWords {
    /// `"english"` or `"none"`
    Language(String),
    Terms(Vec<String>),
}

impl StopWords {
    pub fn english() -> Self {
        StopWords::Language("english".to_string())
    }

    pub fn none() -> Self {
        StopWords::Language("none".to_string())
    }

    /// The lowercase set of terms to drop
    pub fn resolve(&self) -> Result<HashSet<String>> {
        match self {
            StopWords::Language(lang) => match lang.to_lowercase().as_str() {
                "english" => Ok(ENGLISH.iter().map(|w| w.to_string()).collect()),
                "none" => Ok(HashSet::new()),
                _ => Err(PipelineError::UnknownStopWordLanguage(lang.clone())),
            },
            StopWords::Terms(terms) => Ok(terms.iter().map(|t| t.to_lowercase()).collect()),
        }
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::english()
    }
}

impl std::str::FromStr for StopWords {
    type Err = PipelineError;

    /// `"english"` or `"none"`; anything else is a comma-separated term
    /// list, so a single word is a one-term list.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if matches!(trimmed.to_lowercase().as_str(), "english" | "none") {
            return Ok(StopWords::Language(trimmed.to_string()));
        }
        let terms = trimmed
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        Ok(StopWords::Terms(terms))
    }
}
