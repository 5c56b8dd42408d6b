//! Structured-output extraction: free text in, schema-conformant record out.
//!
//! [`extract_structured`] never fails. It walks the ordered strategy
//! cascade in [`strategy`] — strict JSON, embedded JSON, labeled sections,
//! paragraph heuristic, positional partition — and assembles a fully
//! populated record of the requested kind from whichever tier succeeds
//! first. The positional tier cannot decline, so even an empty string or a
//! punctuation-free wall of text produces a complete record.
//!
//! A tier-1/2 JSON hit whose shape does not fit the requested kind is not a
//! success; the cascade keeps going.

pub mod evaluation;
pub mod insights;
pub mod items;
pub mod json_scan;
pub mod sections;
pub mod strategy;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::types::{CompatibilityRecord, DocumentKind, ExtractionResult};

pub use evaluation::normalize_evaluation;
pub use insights::SubjectProfile;
pub use strategy::TierOutcome;

/// Extract a record of `kind` from `raw`, with an anonymous subject for
/// insight padding.
#[must_use]
pub fn extract_structured(kind: DocumentKind, raw: &str) -> ExtractionResult {
    extract_structured_for(kind, raw, &SubjectProfile::default())
}

/// Extract a record of `kind` from `raw`; `subject` feeds the deterministic
/// insight-padding templates when fewer than five insights are recoverable.
#[must_use]
#[instrument(skip(raw, subject), fields(kind = %kind, raw_len = raw.len()))]
pub fn extract_structured_for(
    kind: DocumentKind,
    raw: &str,
    subject: &SubjectProfile,
) -> ExtractionResult {
    let specs = sections::kind_sections(kind);
    for tier in strategy::CASCADE {
        let Some(outcome) = tier.apply(raw, kind, specs) else {
            continue;
        };
        match outcome {
            TierOutcome::Json(value) => {
                if let Some(result) = assemble_from_json(kind, &value, subject) {
                    debug!(tier = tier.name(), "extraction succeeded");
                    return result;
                }
                // Valid JSON, wrong shape for this kind; keep cascading.
            }
            TierOutcome::Sections(texts) => {
                debug!(tier = tier.name(), "extraction succeeded");
                return assemble_from_sections(kind, &texts, subject);
            }
        }
    }
    // The positional tier always returns sections.
    unreachable!("cascade terminal tier cannot decline")
}

// ── JSON assembly (tiers 1–2) ──────────────────────────────────────────

/// Fit a parsed JSON document to `kind`'s schema, or report a shape
/// mismatch.
///
/// JSON-sourced values are taken verbatim: no item filtering, so a valid
/// document round-trips exactly. The insights kind accepts both the
/// `{"insights": [...]}` object form and a bare top-level string array.
fn assemble_from_json(
    kind: DocumentKind,
    value: &Value,
    subject: &SubjectProfile,
) -> Option<ExtractionResult> {
    match kind {
        DocumentKind::Compatibility => {
            let team_work = string_array(value, &["teamWork", "team_work"]);
            let conflicts = string_array(value, &["conflicts"]);
            let breaks_first = string_array(value, &["breaksFirst", "breaks_first"]);
            if team_work.is_none() && conflicts.is_none() && breaks_first.is_none() {
                return None;
            }
            Some(ExtractionResult::Compatibility(CompatibilityRecord {
                team_work: team_work.unwrap_or_default(),
                conflicts: conflicts.unwrap_or_default(),
                breaks_first: breaks_first.unwrap_or_default(),
            }))
        }
        DocumentKind::Evaluation => {
            let recognized = ["checks", "qualityChecks", "quality_checks", "autoScore", "auto_score", "explanation"];
            if !recognized.iter().any(|key| value.get(key).is_some()) {
                return None;
            }
            Some(ExtractionResult::Evaluation(evaluation::record_from_json(
                value,
            )))
        }
        DocumentKind::Insights => {
            let items = if let Some(items) = value.as_array() {
                items
            } else {
                value.get("insights").and_then(Value::as_array)?
            };
            let list: Vec<String> = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
            Some(ExtractionResult::Insights(insights::pad_insights(
                list, subject,
            )))
        }
    }
}

/// Array of strings under the first present key, if any.
fn string_array(value: &Value, keys: &[&str]) -> Option<Vec<String>> {
    let array = keys.iter().find_map(|key| value.get(*key))?.as_array()?;
    Some(
        array
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

// ── Section assembly (tiers 3–5) ───────────────────────────────────────

fn assemble_from_sections(
    kind: DocumentKind,
    texts: &[String],
    subject: &SubjectProfile,
) -> ExtractionResult {
    match kind {
        DocumentKind::Compatibility => {
            let section = |i: usize| texts.get(i).map(String::as_str).unwrap_or("");
            ExtractionResult::Compatibility(CompatibilityRecord {
                team_work: items::split_items(section(0)),
                conflicts: items::split_items(section(1)),
                breaks_first: items::split_items(section(2)),
            })
        }
        DocumentKind::Evaluation => {
            ExtractionResult::Evaluation(evaluation::record_from_sections(texts))
        }
        DocumentKind::Insights => {
            let text = texts.first().map(String::as_str).unwrap_or("");
            ExtractionResult::Insights(insights::pad_insights(
                items::split_items(text),
                subject,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_json_compatibility_round_trips() {
        let raw = r#"{"teamWork":["a"],"conflicts":[],"breaksFirst":["b"]}"#;
        let result = extract_structured(DocumentKind::Compatibility, raw);
        let ExtractionResult::Compatibility(record) = result else {
            panic!("wrong kind");
        };
        assert_eq!(record.team_work, vec!["a"]);
        assert!(record.conflicts.is_empty());
        assert_eq!(record.breaks_first, vec!["b"]);
    }

    #[test]
    fn fenced_json_hits_tier_one() {
        let raw = "```json\n{\"teamWork\": [\"shared chaos tolerance\"]}\n```";
        let ExtractionResult::Compatibility(record) =
            extract_structured(DocumentKind::Compatibility, raw)
        else {
            panic!("wrong kind");
        };
        assert_eq!(record.team_work, vec!["shared chaos tolerance"]);
    }

    #[test]
    fn json_of_wrong_shape_falls_through() {
        // A valid object, but with none of the compatibility keys: the
        // cascade must keep going and still produce a full record.
        let raw = r#"{"unrelated": true}"#;
        let result = extract_structured(DocumentKind::Compatibility, raw);
        assert!(matches!(result, ExtractionResult::Compatibility(_)));
    }

    #[test]
    fn embedded_json_recovered_from_prose() {
        let raw = "Here you go!\n{\"conflicts\": [\"volume control\"]}\nEnjoy.";
        let ExtractionResult::Compatibility(record) =
            extract_structured(DocumentKind::Compatibility, raw)
        else {
            panic!("wrong kind");
        };
        assert_eq!(record.conflicts, vec!["volume control"]);
    }

    #[test]
    fn empty_input_still_yields_full_records() {
        for kind in [
            DocumentKind::Compatibility,
            DocumentKind::Evaluation,
            DocumentKind::Insights,
        ] {
            let result = extract_structured(kind, "");
            assert_eq!(result.kind(), kind);
            if let ExtractionResult::Insights(list) = &result {
                assert_eq!(list.len(), insights::INSIGHT_COUNT);
            }
        }
    }

    #[test]
    fn insights_bare_json_array_accepted_at_tier_one() {
        let raw = r#"["knows every portal shortcut", "owns a cursed garage"]"#;
        let ExtractionResult::Insights(list) = extract_structured(DocumentKind::Insights, raw)
        else {
            panic!("wrong kind");
        };
        assert_eq!(list[0], "knows every portal shortcut");
        assert_eq!(list[1], "owns a cursed garage");
        assert_eq!(list.len(), insights::INSIGHT_COUNT);
    }

    #[test]
    fn insights_array_embedded_in_prose_recovered() {
        let raw = "Here they are:\n[\"collects broken portal guns\", \"never sleeps twice in the same dimension\"]\nEnjoy.";
        let ExtractionResult::Insights(list) = extract_structured(DocumentKind::Insights, raw)
        else {
            panic!("wrong kind");
        };
        assert_eq!(list[0], "collects broken portal guns");
        assert_eq!(list[1], "never sleeps twice in the same dimension");
    }

    #[test]
    fn bare_array_wrong_kind_falls_through() {
        // An array is only schema-conformant for insights; other kinds must
        // keep cascading and still produce a full record.
        let raw = r#"["not a compatibility document"]"#;
        let result = extract_structured(DocumentKind::Compatibility, raw);
        assert!(matches!(result, ExtractionResult::Compatibility(_)));
    }

    #[test]
    fn insights_json_array_padded() {
        let raw = r#"{"insights": ["one real insight about portals"]}"#;
        let ExtractionResult::Insights(list) = extract_structured(DocumentKind::Insights, raw)
        else {
            panic!("wrong kind");
        };
        assert_eq!(list.len(), insights::INSIGHT_COUNT);
        assert_eq!(list[0], "one real insight about portals");
    }

    #[test]
    fn unstructured_prose_reaches_positional_tier() {
        // No JSON, no headers, no blank lines: only the terminal tier fits.
        let raw = "x".repeat(300);
        let ExtractionResult::Compatibility(record) =
            extract_structured(DocumentKind::Compatibility, &raw)
        else {
            panic!("wrong kind");
        };
        // Positional partitions feed the item splitter; a single unbroken
        // token per partition survives as one sentence-split item each.
        assert_eq!(record.team_work.len(), 1);
        assert_eq!(record.team_work[0].len(), 100);
    }
}
