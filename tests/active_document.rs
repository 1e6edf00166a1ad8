use std::sync::Arc;
use std::thread;

use proptest::prelude::*;

use docdex::analysis::analyzer::normalize;
use docdex::core::config::Config;
use docdex::core::state::ActiveDocumentState;
use docdex::index::blob::IndexBlob;
use docdex::index::positional::PositionalIndex;
use docdex::search::results::SearchResults;

fn blob(text: &str) -> IndexBlob {
    PositionalIndex::build(normalize(text)).to_blob()
}

#[test]
fn snippets_are_highlighted_and_capped() {
    let state = ActiveDocumentState::default();
    let text = (0..12)
        .map(|i| format!("filler{} needle word", i))
        .collect::<Vec<_>>()
        .join(" ");
    state.switch(blob(&text), "haystack.txt").unwrap();

    let results = state.search_phrase("Needle Word");
    assert_eq!(results.match_count, 12);
    assert_eq!(results.snippets.len(), 5);
    for snippet in &results.snippets {
        assert!(snippet.starts_with("...") && snippet.ends_with("..."));
        assert!(snippet.contains("<strong>needle</strong> <strong>word</strong>"));
    }
}

#[test]
fn config_controls_rendering() {
    let config = Config {
        max_snippets: 1,
        context_window: 1,
        ..Config::default()
    };
    let state = ActiveDocumentState::from_config(&config);
    state.switch(blob("a b c d e c f"), "letters.txt").unwrap();

    let results = state.search_phrase("c");
    assert_eq!(results.match_count, 2);
    assert_eq!(results.snippets, vec!["...b <strong>c</strong> d..."]);
}

#[test]
fn highlighting_does_not_touch_longer_words() {
    let state = ActiveDocumentState::default();
    state.switch(blob("the cat sleeps in the category aisle"), "cats.txt").unwrap();
    let results = state.search_phrase("cat");
    assert_eq!(results.match_count, 1);
    assert!(results.snippets[0].contains("<strong>cat</strong> sleeps"));
    assert!(results.snippets[0].contains(" category "));
}

#[test]
fn status_reports_label() {
    let state = ActiveDocumentState::default();
    assert!(!state.status().active);

    state.switch(blob("one two"), "numbers.txt").unwrap();
    let status = state.status();
    assert!(status.active);
    assert_eq!(status.indexed_file, "numbers.txt");
    assert!(status.activated_at.is_some());
}

#[test]
fn readers_never_observe_a_mixed_document() {
    let state = Arc::new(ActiveDocumentState::default());
    state.switch(blob("left left left"), "left").unwrap();

    let writer = {
        let state = state.clone();
        thread::spawn(move || {
            for i in 0..200 {
                if i % 2 == 0 {
                    state.switch(blob("right right"), "right").unwrap();
                } else {
                    state.switch(blob("left left left"), "left").unwrap();
                }
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let state = state.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    let status = state.status();
                    match status.indexed_file.as_str() {
                        "left" => assert_eq!(status.token_count, 3),
                        "right" => assert_eq!(status.token_count, 2),
                        other => panic!("unexpected label {}", other),
                    }
                    let left = state.search_phrase("left").match_count;
                    let right = state.search_phrase("right").match_count;
                    assert!(left == 3 || left == 0);
                    assert!(right == 2 || right == 0);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}

proptest! {
    #[test]
    fn cleared_state_answers_nothing(query in "\\PC{0,20}", prefix in "\\PC{0,5}") {
        let state = ActiveDocumentState::default();
        state.switch(blob("some indexed words for the property"), "doc.txt").unwrap();
        state.clear();

        prop_assert_eq!(state.search_phrase(&query), SearchResults::empty());
        prop_assert!(state.autocomplete_prefix(&prefix).is_empty());
    }
}
