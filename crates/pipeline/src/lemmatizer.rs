//! Lemmatizer: reduces tag-document words to their base form.
//!
//! ## Document rules
//! 1. Split on whitespace
//! 2. Lowercase each token
//! 3. Drop tokens that are not purely alphanumeric (`"century,"`, `"--"`)
//! 4. Lemmatize what is left and join with single spaces
//!
//! `EnglishLemmatizer` has no dictionary to check candidates against, so
//! suffix rules are paired with exception lists. By default only noun
//! rules apply (plural -> singular); verb rules (`-ing`, `-ed`, irregular
//! past forms) are switched on with `with_verb_rules(true)`.
//!
//! Words on the built-in English stop-word list are function words, not
//! inflected content words, and come back unchanged so the vectorizer
//! still recognises them.

use crate::error::{PipelineError, Result};
use crate::stop_words::ENGLISH;
use crate::tags::TagDocument;
use crate::traits::{Lemmatizer, Reporter, Stage};
use data_loader::ItemId;
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::LazyLock;

static FUNCTION_WORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ENGLISH.iter().copied().collect());

/// Irregular plurals and plural forms the suffix rules get wrong
const IRREGULAR_NOUNS: &[(&str, &str)] = &[
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("lice", "louse"),
    ("oxen", "ox"),
    ("wives", "wife"),
    ("knives", "knife"),
    ("lives", "life"),
    ("wolves", "wolf"),
    ("thieves", "thief"),
    ("leaves", "leaf"),
    ("halves", "half"),
    ("selves", "self"),
    ("shelves", "shelf"),
    ("calves", "calf"),
    ("elves", "elf"),
    ("loaves", "loaf"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("vertices", "vertex"),
    ("crises", "crisis"),
    ("analyses", "analysis"),
    ("theses", "thesis"),
    ("hypotheses", "hypothesis"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("heroes", "hero"),
    ("potatoes", "potato"),
    ("tomatoes", "tomato"),
    ("echoes", "echo"),
    ("volcanoes", "volcano"),
    ("torpedoes", "torpedo"),
    ("quizzes", "quiz"),
];

/// Words ending in `s` that are not plurals (or have no singular)
const INVARIANT_WORDS: &[&str] = &[
    "series", "species", "news", "physics", "mathematics", "politics", "economics",
    "ethics", "athletics", "aircraft", "sheep", "deer", "fish", "moose", "means",
    "chaos", "does", "goes", "yes", "gas", "alias", "atlas", "bias", "canvas",
    "christmas", "texas", "lens", "pants", "jeans", "scissors", "headquarters",
    "whereabouts", "olympics",
];

/// Singular nouns ending in `-s` whose plural is `-ses`
const S_NOUNS: &[&str] = &["gas", "alias", "atlas", "bias", "canvas", "lens", "iris", "fracas"];

/// Singular nouns ending in `-ie`, so `-ies` must not become `-y`
const IE_NOUNS: &[&str] = &[
    "movie", "cookie", "zombie", "rookie", "hippie", "calorie", "brownie", "genie",
    "prairie", "goalie", "selfie", "auntie", "pixie", "freebie", "smoothie", "newbie",
    "roadie", "junkie", "groupie", "hoodie", "veggie", "sweetie", "cutie", "hottie",
    "bootie", "collie", "birdie", "budgie", "eerie", "sortie", "lingerie", "magpie",
];

/// Singular nouns ending in `-che`/`-se`/`-xe`/`-ze` that only add `s`
const E_ENDING_NOUNS: &[&str] = &[
    "ache", "headache", "niche", "cache", "avalanche", "moustache", "mustache",
    "quiche", "cliche", "psyche", "microfiche", "axe", "maze", "prize", "size",
    "blaze", "gaze", "breeze", "freeze", "sneeze", "bronze", "snooze",
];

/// Singular nouns ending in `-us` whose plural is `-uses`
const US_NOUNS: &[&str] = &[
    "bus", "virus", "bonus", "campus", "circus", "genius", "census", "status",
    "walrus", "octopus", "cactus", "chorus", "fungus", "nexus", "lotus", "prospectus",
    "syllabus", "hippopotamus", "abacus", "apparatus",
];

/// Nouns ending in `-men` that are already singular
const MEN_SINGULARS: &[&str] = &[
    "specimen", "abdomen", "regimen", "stamen", "acumen", "carmen", "dolmen", "bitumen",
    "albumen", "cyclamen", "gravamen",
];

const IRREGULAR_VERBS: &[(&str, &str)] = &[
    ("went", "go"), ("gone", "go"), ("goes", "go"), ("did", "do"), ("does", "do"),
    ("took", "take"), ("taken", "take"), ("came", "come"),
    ("saw", "see"), ("seen", "see"), ("knew", "know"), ("known", "know"),
    ("got", "get"), ("gotten", "get"), ("gave", "give"), ("given", "give"),
    ("thought", "think"), ("told", "tell"),
    ("felt", "feel"), ("brought", "bring"), ("began", "begin"), ("begun", "begin"),
    ("kept", "keep"), ("held", "hold"), ("wrote", "write"), ("written", "write"),
    ("stood", "stand"), ("heard", "hear"), ("meant", "mean"), ("met", "meet"),
    ("ran", "run"), ("paid", "pay"), ("said", "say"), ("sat", "sit"),
    ("spoke", "speak"), ("spoken", "speak"), ("led", "lead"), ("grew", "grow"),
    ("grown", "grow"), ("lost", "lose"), ("fell", "fall"), ("fallen", "fall"),
    ("sent", "send"), ("built", "build"), ("understood", "understand"),
    ("drew", "draw"), ("drawn", "draw"), ("broke", "break"), ("broken", "break"),
    ("spent", "spend"), ("rose", "rise"), ("risen", "rise"), ("drove", "drive"),
    ("driven", "drive"), ("bought", "buy"), ("wore", "wear"), ("worn", "wear"),
    ("chose", "choose"), ("chosen", "choose"), ("sought", "seek"), ("threw", "throw"),
    ("thrown", "throw"), ("caught", "catch"), ("dealt", "deal"), ("won", "win"),
    ("fought", "fight"), ("flew", "fly"), ("flown", "fly"), ("hid", "hide"),
    ("hidden", "hide"), ("sang", "sing"), ("sung", "sing"), ("swam", "swim"),
    ("stole", "steal"), ("stolen", "steal"), ("fled", "flee"), ("forgot", "forget"),
    ("forgotten", "forget"), ("forgave", "forgive"), ("shot", "shoot"),
    ("struck", "strike"), ("slept", "sleep"), ("woke", "wake"), ("woken", "wake"),
    ("rode", "ride"), ("ridden", "ride"), ("ate", "eat"), ("eaten", "eat"),
];

/// Words ending in `-ed` that are not past forms
const NON_VERB_ED: &[&str] = &[
    "hundred", "sacred", "naked", "wicked", "kindred", "beloved", "crooked", "rugged",
    "wretched", "ragged", "jagged", "learned", "aged", "bed", "red", "shed", "sled",
];

/// Rule-based English lemmatizer.
#[derive(Debug, Clone, Default)]
pub struct EnglishLemmatizer {
    verbs: bool,
}

impl EnglishLemmatizer {
    /// Create a lemmatizer with noun rules only
    pub fn new() -> Self {
        Self { verbs: false }
    }

    /// Also apply verb rules (default: false)
    pub fn with_verb_rules(mut self, enabled: bool) -> Self {
        self.verbs = enabled;
        self
    }

    fn lemma(&self, word: &str) -> String {
        if FUNCTION_WORDS.contains(word) {
            return word.to_string();
        }
        if let Some(base) = lookup(IRREGULAR_NOUNS, word) {
            return base.to_string();
        }
        if self.verbs {
            if let Some(base) = lookup(IRREGULAR_VERBS, word) {
                return base.to_string();
            }
        }
        if INVARIANT_WORDS.contains(&word) {
            return word.to_string();
        }
        if self.verbs {
            if let Some(base) = verb_lemma(word) {
                return base;
            }
        }
        noun_lemma(word)
    }
}

impl Lemmatizer for EnglishLemmatizer {
    fn name(&self) -> &str {
        "EnglishLemmatizer"
    }

    fn lemmatize(&self, word: &str) -> Result<String> {
        Ok(self.lemma(word))
    }
}

fn lookup(table: &[(&str, &'static str)], word: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(form, _)| *form == word)
        .map(|(_, base)| *base)
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Plural -> singular
fn noun_lemma(word: &str) -> String {
    let len = word.chars().count();
    if len <= 3 {
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix("ies") {
        let ie = format!("{}ie", stem);
        if len <= 4 || IE_NOUNS.contains(&ie.as_str()) {
            return ie;
        }
        return format!("{}y", stem);
    }

    if let Some(stem) = word.strip_suffix("es") {
        if word.ends_with("sses")
            || word.ends_with("shes")
            || word.ends_with("ches")
            || word.ends_with("xes")
            || word.ends_with("zzes")
        {
            let with_e = &word[..word.len() - 1];
            if E_ENDING_NOUNS.contains(&with_e) {
                return with_e.to_string();
            }
            return stem.to_string();
        }
        if US_NOUNS.contains(&stem) || S_NOUNS.contains(&stem) {
            return stem.to_string();
        }
    }

    if let Some(stem) = word.strip_suffix("selves") {
        return format!("{}self", stem);
    }

    if let Some(stem) = word.strip_suffix("men") {
        if len > 5 && !MEN_SINGULARS.contains(&word) {
            return format!("{}man", stem);
        }
        return word.to_string();
    }

    if let Some(stem) = word.strip_suffix('s') {
        if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
            return word.to_string();
        }
        return stem.to_string();
    }

    word.to_string()
}

/// Inflected verb -> root, or `None` when no verb rule applies
fn verb_lemma(word: &str) -> Option<String> {
    let len = word.chars().count();

    if let Some(stem) = word.strip_suffix("ied") {
        return Some(if len <= 4 {
            format!("{}ie", stem)
        } else {
            format!("{}y", stem)
        });
    }

    let stem = if let Some(stem) = word.strip_suffix("ing") {
        if word.ends_with("thing") {
            return None;
        }
        stem
    } else if let Some(stem) = word.strip_suffix("ed") {
        if word.ends_with("eed") || NON_VERB_ED.contains(&word) {
            return None;
        }
        stem
    } else {
        return None;
    };

    let chars: Vec<char> = stem.chars().collect();
    if chars.len() < 3 || !chars.iter().any(|&c| is_vowel(c) || c == 'y') {
        return None;
    }

    Some(restore_stem(&chars))
}

/// Undo consonant doubling (`runn` -> `run`) or restore a silent `e`
/// (`mak` -> `make`, `danc` -> `dance`).
fn restore_stem(chars: &[char]) -> String {
    let n = chars.len();
    let last = chars[n - 1];
    let prev = chars[n - 2];

    if last == prev && !is_vowel(last) && !matches!(last, 'l' | 's' | 'z') {
        return chars[..n - 1].iter().collect();
    }

    let stem: String = chars.iter().collect();
    let short_cvc = n == 3
        && !is_vowel(chars[0])
        && is_vowel(chars[1])
        && !is_vowel(last)
        && !matches!(last, 'w' | 'x' | 'y');
    let soft_ending = last == 'v' || (last == 'c' && matches!(prev, 'n' | 'r' | 'u'));

    if short_cvc || soft_ending {
        format!("{}e", stem)
    } else {
        stem
    }
}

/// Lemmatize one space-joined tag document.
///
/// Fails only when the text carries U+FFFD, i.e. it was decoded from
/// invalid UTF-8 upstream, or when the lemmatizer rejects a word.
pub fn lemmatize_text(lemmatizer: &dyn Lemmatizer, text: &str) -> Result<String> {
    if text.contains(char::REPLACEMENT_CHARACTER) {
        return Err(PipelineError::Lemmatization(
            "malformed encoding (U+FFFD in input)".to_string(),
        ));
    }

    let mut lemmas = Vec::new();
    for token in text.split_whitespace() {
        let lower = token.to_lowercase();
        if !lower.chars().all(char::is_alphanumeric) {
            continue;
        }
        lemmas.push(lemmatizer.lemmatize(&lower)?);
    }
    Ok(lemmas.join(" "))
}

/// Lemmatize every document in parallel. Output order matches input.
///
/// A failing item is reported and gets `""`; the batch carries on.
pub fn lemmatize_documents(
    lemmatizer: &dyn Lemmatizer,
    ids: &[ItemId],
    documents: &[TagDocument],
    reporter: &dyn Reporter,
) -> Vec<String> {
    debug_assert_eq!(ids.len(), documents.len());
    ids.par_iter()
        .zip(documents.par_iter())
        .map(|(&item_id, document)| {
            match lemmatize_text(lemmatizer, &document.to_text()) {
                Ok(text) => text,
                Err(error) => {
                    reporter.report(Stage::Lemmatize, item_id, &error);
                    String::new()
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;

    fn noun(word: &str) -> String {
        EnglishLemmatizer::new().lemmatize(word).unwrap()
    }

    fn verb(word: &str) -> String {
        EnglishLemmatizer::new()
            .with_verb_rules(true)
            .lemmatize(word)
            .unwrap()
    }

    #[test]
    fn test_plural_nouns() {
        assert_eq!(noun("aliens"), "alien");
        assert_eq!(noun("stories"), "story");
        assert_eq!(noun("movies"), "movie");
        assert_eq!(noun("ties"), "tie");
        assert_eq!(noun("classes"), "class");
        assert_eq!(noun("churches"), "church");
        assert_eq!(noun("headaches"), "headache");
        assert_eq!(noun("boxes"), "box");
        assert_eq!(noun("wishes"), "wish");
        assert_eq!(noun("viruses"), "virus");
        assert_eq!(noun("houses"), "house");
        assert_eq!(noun("policemen"), "policeman");
        assert_eq!(noun("women"), "woman");
        assert_eq!(noun("wolves"), "wolf");
        assert_eq!(noun("heroes"), "hero");
        assert_eq!(noun("gases"), "gas");
        assert_eq!(noun("aliases"), "alias");
        assert_eq!(noun("cases"), "case");
        assert_eq!(noun("quizzes"), "quiz");
        assert_eq!(noun("buzzes"), "buzz");
        assert_eq!(noun("firemen"), "fireman");
    }

    #[test]
    fn test_nouns_left_alone() {
        for word in [
            "class", "virus", "crisis", "series", "news", "specimen", "bus", "was", "action",
            "carmen",
        ] {
            assert_eq!(noun(word), word, "{} should be unchanged", word);
        }
    }

    #[test]
    fn test_verb_rules_are_opt_in() {
        assert_eq!(noun("running"), "running");
        assert_eq!(noun("jumped"), "jumped");

        assert_eq!(verb("running"), "run");
        assert_eq!(verb("jumped"), "jump");
        assert_eq!(verb("killing"), "kill");
        assert_eq!(verb("making"), "make");
        assert_eq!(verb("danced"), "dance");
        assert_eq!(verb("tried"), "try");
        assert_eq!(verb("opening"), "open");
        assert_eq!(verb("went"), "go");
        assert_eq!(verb("ran"), "run");
    }

    #[test]
    fn test_stop_words_come_back_unchanged() {
        for lemmatizer in [EnglishLemmatizer::new(), EnglishLemmatizer::new().with_verb_rules(true)] {
            for &word in ENGLISH {
                assert_eq!(lemmatizer.lemmatize(word).unwrap(), word);
            }
        }
        assert_eq!(noun("themselves"), "themselves");
        assert_eq!(verb("during"), "during");
        assert_eq!(verb("made"), "made");
    }

    #[test]
    fn test_verb_rules_keep_non_verbs() {
        for word in ["nothing", "king", "string", "need", "hundred", "red"] {
            assert_eq!(verb(word), word, "{} should be unchanged", word);
        }
        assert_eq!(verb("aliens"), "alien");
    }

    #[test]
    fn test_lemmatize_text_filters_and_lowercases() {
        let lemmatizer = EnglishLemmatizer::new();
        let text = "In the 22nd century, a Marine fights ALIENS -- JamesCameron";
        assert_eq!(
            lemmatize_text(&lemmatizer, text).unwrap(),
            "in the 22nd a marine fight alien jamescameron"
        );
    }

    #[test]
    fn test_lemmatize_text_empty() {
        let lemmatizer = EnglishLemmatizer::new();
        assert_eq!(lemmatize_text(&lemmatizer, "").unwrap(), "");
        assert_eq!(lemmatize_text(&lemmatizer, "... !!").unwrap(), "");
    }

    #[test]
    fn test_unicode_letters_are_alphanumeric() {
        let lemmatizer = EnglishLemmatizer::new();
        assert_eq!(lemmatize_text(&lemmatizer, "Amélie Café").unwrap(), "amélie café");
    }

    #[test]
    fn test_malformed_encoding_falls_back_to_empty() {
        let lemmatizer = EnglishLemmatizer::new();
        let reporter = CollectingReporter::new();
        let documents = vec![
            TagDocument::new(vec!["space".into(), "stations".into()]),
            TagDocument::new(vec!["caf\u{FFFD}".into(), "robots".into()]),
            TagDocument::new(vec!["robots".into()]),
        ];

        let lemmatized = lemmatize_documents(&lemmatizer, &[1, 2, 3], &documents, &reporter);
        assert_eq!(lemmatized, vec!["space station", "", "robot"]);

        let issues = reporter.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].item_id, 2);
        assert_eq!(issues[0].stage, Stage::Lemmatize);
    }
}
