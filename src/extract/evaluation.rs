//! Evaluation-record assembly and normalization.
//!
//! Evaluation output has a closed set of boolean check fields. Whatever the
//! extraction tier recovered, the record that leaves this module carries
//! every enumerated key with a genuine boolean, a score clamped to
//! `[0, 10]`, and a non-empty explanation. [`normalize_evaluation`] is the
//! final gate: it asserts field completeness rather than trusting upstream
//! defaulting.

use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::warn;

use crate::types::EvaluationRecord;

/// Enumerated factual check fields.
pub const CHECKS: &[&str] = &[
    "mentions_name",
    "mentions_species",
    "mentions_status",
    "mentions_location",
    "consistent_with_canon",
];

/// Enumerated quality check fields.
pub const QUALITY_CHECKS: &[&str] = &["coherent", "concise", "in_universe"];

/// Placeholder when no explanation is recoverable.
pub const DEFAULT_EXPLANATION: &str = "No explanation was provided by the evaluator.";

static SCORE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:score|rating)\s*[:=]?\s*(\d{1,2}(?:\.\d+)?)|(\d{1,2}(?:\.\d+)?)\s*(?:/|out\s+of)\s*10")
        .expect("score pattern must compile")
});

static CHECK_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(?:[-*•]\s*)?([a-z][a-z0-9_ ]{1,40}?)\s*[:=]\s*(true|false|yes|no|pass|fail|✓|✗|✅|❌)")
        .expect("check line pattern must compile")
});

/// Lift one JSON map of checks into booleans over the enumerated keys.
///
/// Missing keys default to `false`. Non-boolean values are *not* silently
/// trusted: they are coerced to `false` with a warning, which keeps the
/// boolean-typed guarantee while surfacing the malformed field.
fn lift_checks(source: Option<&Value>, enumerated: &[&str]) -> BTreeMap<String, bool> {
    let map = source.and_then(Value::as_object);
    enumerated
        .iter()
        .map(|key| {
            let value = map.and_then(|m| m.get(*key));
            let flag = match value {
                Some(Value::Bool(b)) => *b,
                Some(other) => {
                    warn!(key, value = %other, "non-boolean check value coerced to false");
                    false
                }
                None => false,
            };
            ((*key).to_string(), flag)
        })
        .collect()
}

/// Build an evaluation record from a parsed JSON object (tiers 1–2).
#[must_use]
pub fn record_from_json(value: &Value) -> EvaluationRecord {
    let auto_score = value
        .get("autoScore")
        .or_else(|| value.get("auto_score"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let explanation = value
        .get("explanation")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_EXPLANATION)
        .to_string();

    normalize_evaluation(EvaluationRecord {
        checks: lift_checks(value.get("checks"), CHECKS),
        quality_checks: lift_checks(
            value.get("qualityChecks").or_else(|| value.get("quality_checks")),
            QUALITY_CHECKS,
        ),
        auto_score,
        explanation,
    })
}

/// Build an evaluation record from the three text sections
/// (checks, quality checks, verdict), tiers 3–5.
#[must_use]
pub fn record_from_sections(sections: &[String]) -> EvaluationRecord {
    let checks_text = sections.first().map(String::as_str).unwrap_or("");
    let quality_text = sections.get(1).map(String::as_str).unwrap_or("");
    let verdict_text = sections.get(2).map(String::as_str).unwrap_or("");

    let auto_score = parse_score(verdict_text).unwrap_or(0.0);
    let explanation = verdict_text.trim();
    let explanation = if explanation.is_empty() {
        DEFAULT_EXPLANATION.to_string()
    } else {
        explanation.to_string()
    };

    normalize_evaluation(EvaluationRecord {
        checks: parse_check_lines(checks_text, CHECKS),
        quality_checks: parse_check_lines(quality_text, QUALITY_CHECKS),
        auto_score,
        explanation,
    })
}

/// Parse `name: yes/no`-style lines and map them onto the enumerated keys.
fn parse_check_lines(text: &str, enumerated: &[&str]) -> BTreeMap<String, bool> {
    let mut found: BTreeMap<String, bool> = BTreeMap::new();
    for caps in CHECK_LINE.captures_iter(text) {
        let raw_key = caps[1].trim().to_lowercase().replace(' ', "_");
        let flag = matches!(
            caps[2].to_lowercase().as_str(),
            "true" | "yes" | "pass" | "✓" | "✅"
        );
        found.insert(raw_key, flag);
    }
    enumerated
        .iter()
        .map(|key| {
            let flag = found.get(*key).copied().unwrap_or(false);
            ((*key).to_string(), flag)
        })
        .collect()
}

/// First plausible 0–10 score mentioned in the text.
fn parse_score(text: &str) -> Option<f64> {
    let caps = SCORE_PATTERN.captures(text)?;
    let raw = caps.get(1).or_else(|| caps.get(2))?.as_str();
    raw.parse::<f64>().ok().filter(|s| (0.0..=10.0).contains(s))
}

/// Assert the invariants every evaluation record must satisfy on exit:
/// all enumerated check keys present and boolean, score within `[0, 10]`,
/// explanation non-empty.
#[must_use]
pub fn normalize_evaluation(mut record: EvaluationRecord) -> EvaluationRecord {
    for key in CHECKS {
        if !record.checks.contains_key(*key) {
            warn!(key, "enumerated check missing from record; defaulting to false");
            record.checks.insert((*key).to_string(), false);
        }
    }
    record.checks.retain(|key, _| CHECKS.contains(&key.as_str()));

    for key in QUALITY_CHECKS {
        if !record.quality_checks.contains_key(*key) {
            warn!(key, "enumerated quality check missing from record; defaulting to false");
            record.quality_checks.insert((*key).to_string(), false);
        }
    }
    record
        .quality_checks
        .retain(|key, _| QUALITY_CHECKS.contains(&key.as_str()));

    if !record.auto_score.is_finite() {
        record.auto_score = 0.0;
    }
    record.auto_score = record.auto_score.clamp(0.0, 10.0);

    if record.explanation.trim().is_empty() {
        record.explanation = DEFAULT_EXPLANATION.to_string();
    }
    record
}
