// tests/status_record_properties.rs

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use proptest::prelude::*;
use respawn::fs::mock::MockFileSystem;
use respawn::status::{STATE_KEY, StateClassifier, StatusRecord};
use respawn::types::ResponseState;

const STATUS: &str = "/srv/bot/instance.properties";

fn classify(contents: &str) -> ResponseState {
    let fs = MockFileSystem::new();
    fs.add_file(STATUS, contents);
    StateClassifier::new(Arc::new(fs), STATUS).classify()
}

fn state_strategy() -> impl Strategy<Value = ResponseState> {
    prop::sample::select(ResponseState::ALL.to_vec())
}

proptest! {
    // Whatever the managed process stores next to the state survives a
    // rewrite by the supervisor.
    #[test]
    fn rewritten_record_keeps_every_entry(
        entries in prop::collection::btree_map(any::<String>(), any::<String>(), 0..8),
    ) {
        let mut record = StatusRecord::new();
        for (k, v) in &entries {
            record.set(k.clone(), v.clone());
        }

        let reparsed = StatusRecord::parse(&record.render("instance status"));

        let got: BTreeMap<String, String> = reparsed
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        prop_assert_eq!(got, entries);
    }

    #[test]
    fn parsing_arbitrary_text_never_panics(text in any::<String>()) {
        let _ = StatusRecord::parse(&text);
    }

    // Truncated, non-hex and unpaired-surrogate `\u` escapes, mixed with
    // line breaks and multi-byte text.
    #[test]
    fn broken_unicode_escapes_never_panic(
        text in "(k=|\\\\u[0-9a-fA-FdDxz\u{e4}]{0,5}|\\\\u[dD][89abAB][0-9a-f]{2}|\\\\|\r|\n|\u{e4}){0,12}",
    ) {
        let record = StatusRecord::parse(&text);
        let again = StatusRecord::parse(&record.render("status"));
        prop_assert_eq!(again, record);
    }

    #[test]
    fn state_names_classify_to_themselves(state in state_strategy(), noise in "[a-z]{1,8}") {
        prop_assume!(noise != STATE_KEY);
        let mut record = StatusRecord::new();
        record.set(STATE_KEY, state.name());
        record.set(noise, "x");

        prop_assert_eq!(classify(&record.render("status")), state);
    }

    #[test]
    fn anything_else_is_unknown(value in "[A-Za-z_]{0,12}") {
        prop_assume!(ResponseState::ALL.iter().all(|s| s.name() != value));

        let state = classify(&format!("{STATE_KEY}={value}\n"));
        prop_assert_eq!(state, ResponseState::Unknown);
        prop_assert!(state.is_unexpected());
    }
}

#[test]
fn missing_record_is_empty_not_unknown() {
    let fs = MockFileSystem::new();
    let mut classifier = StateClassifier::new(Arc::new(fs), Path::new(STATUS));
    assert_eq!(classifier.classify(), ResponseState::Empty);
}
