//! Integration tests for the pipeline.
//!
//! These tests run a small corpus parsed from JSON lines through every
//! stage, the way the batch build does.

use data_loader::parser::parse_corpus_str;
use pipeline::{
    CollectingReporter, EnglishLemmatizer, FeaturePipeline, FieldKind, PipelineError, Stage,
    StopWords, VectorizerConfig,
};
use std::sync::Arc;

const CORPUS: &str = r#"{"id": 1, "title": "Avatar", "overview": "Marines explore an alien moon.", "genres": [{"name": "Action"}, {"name": "Science Fiction"}], "keywords": "[{\"name\": \"space colony\"}]", "cast": [{"name": "Sam Worthington"}, {"name": "Zoe Saldana"}, {"name": "Sigourney Weaver"}, {"name": "Stephen Lang"}], "crew": [{"name": "James Cameron", "job": "Director"}, {"name": "Jon Landau", "job": "Producer"}]}
{"id": 2, "title": "Aliens", "overview": "Marines fight aliens.", "genres": [{"name": "Action"}], "crew": [{"name": "Gale Anne Hurd", "job": "Producer"}]}
{"id": 3, "title": "Broken", "overview": "A film with bad lists.", "genres": "[{'name': oops", "cast": 17}
{"id": 4, "title": "Garbled", "overview": "Caf� society"}"#;

fn run(reporter: &CollectingReporter) -> pipeline::PipelineOutput {
    let corpus = parse_corpus_str(CORPUS, "movies.jsonl");
    FeaturePipeline::new()
        .run(corpus.items(), None, reporter)
        .unwrap()
}

#[test]
fn test_tag_documents_follow_field_order() {
    let output = run(&CollectingReporter::new());
    let avatar = output.documents[0].tokens();

    assert_eq!(
        avatar,
        &[
            "Marines",
            "explore",
            "an",
            "alien",
            "moon.",
            "Action",
            "ScienceFiction",
            "spacecolony",
            "SamWorthington",
            "ZoeSaldana",
            "SigourneyWeaver",
            "JamesCameron",
        ]
    );
}

#[test]
fn test_non_director_crew_contributes_nothing() {
    let output = run(&CollectingReporter::new());
    assert_eq!(output.documents[1].tokens(), &["Marines", "fight", "aliens.", "Action"]);
}

#[test]
fn test_bad_items_are_reported_not_fatal() {
    let reporter = CollectingReporter::new();
    let output = run(&reporter);

    assert_eq!(output.vectors.len(), 4);

    let issues = reporter.issues();
    let malformed: Vec<_> = issues
        .iter()
        .filter_map(|issue| match &issue.error {
            PipelineError::MalformedField { item_id, field, .. } => Some((*item_id, *field)),
            _ => None,
        })
        .collect();
    assert_eq!(malformed.len(), 2);
    assert!(malformed.contains(&(3, FieldKind::Genres)));
    assert!(malformed.contains(&(3, FieldKind::Cast)));

    // U+FFFD from lossy decoding fails lemmatization for that item only
    assert_eq!(output.lemmatized[3], "");
    assert!(output.vectors[3].is_zero());
    assert_eq!(reporter.counts_by_stage().get(&Stage::Lemmatize), Some(&1));
}

#[test]
fn test_lemmatized_text_drops_punctuated_tokens() {
    let output = run(&CollectingReporter::new());
    // "moon." is not purely alphanumeric and is dropped
    assert_eq!(
        output.lemmatized[0],
        "marine explore an alien action sciencefiction spacecolony samworthington zoesaldana sigourneyweaver jamescameron"
    );
}

#[test]
fn test_rebuild_is_deterministic() {
    let first = run(&CollectingReporter::new());
    let second = run(&CollectingReporter::new());

    assert_eq!(first.vectorizer, second.vectorizer);
    assert_eq!(first.vectors, second.vectors);
}

#[test]
fn test_verb_rules_are_opt_in() {
    let corpus = parse_corpus_str(
        r#"{"id": 1, "title": "Run", "overview": "running dogs baked cats"}"#,
        "verbs.jsonl",
    );
    let config = VectorizerConfig::new().with_stop_words(StopWords::none());

    let nouns = FeaturePipeline::new()
        .with_vectorizer_config(config.clone())
        .run(corpus.items(), None, &CollectingReporter::new())
        .unwrap();
    assert_eq!(nouns.lemmatized[0], "running dog baked cat");

    let verbs = FeaturePipeline::new()
        .with_vectorizer_config(config)
        .with_lemmatizer(Arc::new(EnglishLemmatizer::new().with_verb_rules(true)))
        .run(corpus.items(), None, &CollectingReporter::new())
        .unwrap();
    assert_eq!(verbs.lemmatized[0], "run dog bake cat");
}

#[test]
fn test_reflexive_pronouns_stay_out_of_vocabulary() {
    let corpus = parse_corpus_str(
        r#"{"id": 1, "title": "Escape", "overview": "They save themselves from aliens"}
{"id": 2, "title": "Escape 2", "overview": "Heroes save themselves again"}"#,
        "pronouns.jsonl",
    );

    let output = FeaturePipeline::new()
        .run(corpus.items(), None, &CollectingReporter::new())
        .unwrap();
    assert_eq!(output.lemmatized[0], "they save themselves from alien");

    let vocabulary = output.vectorizer.vocabulary();
    assert_eq!(vocabulary.column("save"), Some(0));
    assert_eq!(vocabulary.column("themselves"), None);
    assert_eq!(vocabulary.column("themselve"), None);
    assert_eq!(vocabulary.len(), 3);
}

#[test]
fn test_lemmatized_stop_words_never_become_terms() {
    let text = pipeline::stop_words::ENGLISH.join(" ");
    let line = format!(r#"{{"id": 1, "title": "Words", "overview": "{text} robot"}}"#);
    let corpus = parse_corpus_str(&line, "stop.jsonl");

    for verbs in [false, true] {
        let output = FeaturePipeline::new()
            .with_lemmatizer(Arc::new(EnglishLemmatizer::new().with_verb_rules(verbs)))
            .run(corpus.items(), None, &CollectingReporter::new())
            .unwrap();
        assert_eq!(output.vectorizer.vocabulary().terms(), &["robot".to_string()]);
    }
}
