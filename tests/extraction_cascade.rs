//! End-to-end properties of the structured-output cascade.

use proptest::prelude::*;

use loreweave::extract::insights::INSIGHT_COUNT;
use loreweave::extract::strategy::partition_equal;
use loreweave::extract::{SubjectProfile, extract_structured, extract_structured_for};
use loreweave::types::{DocumentKind, ExtractionResult};

const ALL_KINDS: [DocumentKind; 3] = [
    DocumentKind::Compatibility,
    DocumentKind::Evaluation,
    DocumentKind::Insights,
];

fn assert_fully_populated(result: &ExtractionResult) {
    match result {
        ExtractionResult::Compatibility(_) => {
            // All three list fields exist by construction; emptiness is a
            // legal degraded outcome, absence is not.
        }
        ExtractionResult::Evaluation(record) => {
            assert_eq!(record.checks.len(), 5);
            assert_eq!(record.quality_checks.len(), 3);
            assert!((0.0..=10.0).contains(&record.auto_score));
            assert!(!record.explanation.trim().is_empty());
        }
        ExtractionResult::Insights(list) => {
            assert_eq!(list.len(), INSIGHT_COUNT);
            assert!(list.iter().all(|i| !i.trim().is_empty()));
        }
    }
}

#[test]
fn completeness_over_degenerate_inputs() {
    let inputs = [
        "",
        "   \n\t  ",
        "word",
        "?!?!,,,;;;",
        &"loremipsum".repeat(500), // punctuation-free megatext
    ];
    for kind in ALL_KINDS {
        for input in inputs {
            let result = extract_structured(kind, input);
            assert_eq!(result.kind(), kind, "kind mismatch for input {input:.20?}");
            assert_fully_populated(&result);
        }
    }
}

#[test]
fn json_round_trip_is_exact() {
    let raw = r#"{"teamWork":["a"],"conflicts":[],"breaksFirst":["b"]}"#;
    let ExtractionResult::Compatibility(record) =
        extract_structured(DocumentKind::Compatibility, raw)
    else {
        panic!("wrong kind");
    };
    assert_eq!(record.team_work, vec!["a"]);
    assert_eq!(record.conflicts, Vec::<String>::new());
    assert_eq!(record.breaks_first, vec!["b"]);
}

#[test]
fn evaluation_json_defaults_missing_fields() {
    let raw = r#"{"checks": {"mentions_name": true}, "autoScore": 9}"#;
    let ExtractionResult::Evaluation(record) = extract_structured(DocumentKind::Evaluation, raw)
    else {
        panic!("wrong kind");
    };
    assert!(record.checks["mentions_name"]);
    assert!(!record.checks["mentions_status"]);
    assert!(!record.quality_checks["coherent"]);
    assert_eq!(record.auto_score, 9.0);
    assert!(!record.explanation.is_empty());
}

#[test]
fn unheaded_prose_partitions_into_thirds() {
    // 300 characters of unstructured prose, no headers, no blank lines.
    let raw: String = "the two of them wander between dimensions trading barbs and saving each other without ever admitting it ".repeat(3)[..300].to_string();
    let partitions = partition_equal(&raw, 3);
    assert_eq!(partitions.len(), 3);
    assert!(partitions.iter().all(|p| p.chars().count() == 100));
    assert_eq!(partitions.concat(), raw);

    // The cascade reaches the positional tier and still yields a record.
    let result = extract_structured(DocumentKind::Compatibility, &raw);
    assert!(matches!(result, ExtractionResult::Compatibility(_)));
}

#[test]
fn labeled_markdown_report_is_sectioned() {
    let raw = "## Teamwork\n- they improvise their way out of anything\n- both read the room instantly\n\n\
               ## Conflicts\n- neither admits being wrong, ever\n\n\
               ## Breaks first\n- the one with the conscience folds";
    let ExtractionResult::Compatibility(record) =
        extract_structured(DocumentKind::Compatibility, raw)
    else {
        panic!("wrong kind");
    };
    assert_eq!(record.team_work.len(), 2);
    assert_eq!(record.conflicts, vec!["neither admits being wrong, ever"]);
    assert_eq!(record.breaks_first, vec!["the one with the conscience folds"]);
}

#[test]
fn bare_json_array_of_insights_round_trips() {
    let entries = [
        "first insight here",
        "second insight here",
        "third insight here",
        "fourth insight here",
        "fifth insight here",
    ];
    let raw = serde_json::to_string(&entries).unwrap();
    let ExtractionResult::Insights(list) = extract_structured(DocumentKind::Insights, &raw)
    else {
        panic!("wrong kind");
    };
    // The parsed strings come back exactly; no fallback tier mangles them.
    assert_eq!(list, entries);
}

#[test]
fn crlf_fenced_json_still_hits_strict_tier() {
    let raw = "```json\r\n{\"teamWork\":[\"calm under fire\"],\"conflicts\":[],\"breaksFirst\":[]}\r\n```";
    let ExtractionResult::Compatibility(record) =
        extract_structured(DocumentKind::Compatibility, raw)
    else {
        panic!("wrong kind");
    };
    assert_eq!(record.team_work, vec!["calm under fire"]);
}

#[test]
fn insight_padding_appends_after_real_entries() {
    let subject = SubjectProfile::new("Birdperson", "Alive", "Bird-Person", "Bird World");
    let raw = "💡 he speaks only in solemn declarations\n💡 his wedding ended in disaster";
    let ExtractionResult::Insights(list) =
        extract_structured_for(DocumentKind::Insights, raw, &subject)
    else {
        panic!("wrong kind");
    };
    assert_eq!(list.len(), INSIGHT_COUNT);
    assert_eq!(list[0], "he speaks only in solemn declarations");
    assert_eq!(list[1], "his wedding ended in disaster");
    assert!(list[2..].iter().all(|i| i.contains("Birdperson")));
}

proptest! {
    #[test]
    fn partition_always_reconstructs(text in ".{0,400}", n in 1usize..6) {
        let parts = partition_equal(&text, n);
        prop_assert_eq!(parts.len(), n);
        prop_assert_eq!(parts.concat(), text);
    }

    #[test]
    fn partition_lengths_differ_by_at_most_one(text in ".{0,400}", n in 1usize..6) {
        let parts = partition_equal(&text, n);
        let lens: Vec<usize> = parts.iter().map(|p| p.chars().count()).collect();
        let min = lens.iter().min().copied().unwrap_or(0);
        let max = lens.iter().max().copied().unwrap_or(0);
        prop_assert!(max - min <= 1);
    }

    #[test]
    fn extraction_never_panics(kind_idx in 0usize..3, text in ".{0,600}") {
        let result = extract_structured(ALL_KINDS[kind_idx], &text);
        prop_assert_eq!(result.kind(), ALL_KINDS[kind_idx]);
    }
}
