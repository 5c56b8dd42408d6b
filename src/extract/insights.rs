//! Insight-list assembly with deterministic padding.
//!
//! The insights document kind must always carry exactly five entries.
//! Recovered items come first, in extraction order; when fewer than five are
//! recoverable, template-based insights synthesized from the subject's known
//! attributes are appended after them. Padding never reorders or displaces a
//! real insight.

use tracing::debug;

/// Required number of insight entries.
pub const INSIGHT_COUNT: usize = 5;

/// Attributes the padding templates can draw on.
///
/// Defaults keep padding usable when the caller knows nothing about the
/// subject (e.g. extraction outside an entity flow).
#[derive(Debug, Clone)]
pub struct SubjectProfile {
    pub name: String,
    pub status: String,
    pub species: String,
    pub origin: String,
}

impl Default for SubjectProfile {
    fn default() -> Self {
        Self {
            name: "This entity".to_string(),
            status: "unknown".to_string(),
            species: "unknown".to_string(),
            origin: "an unknown origin".to_string(),
        }
    }
}

impl SubjectProfile {
    pub fn new(
        name: impl Into<String>,
        status: impl Into<String>,
        species: impl Into<String>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
            species: species.into(),
            origin: origin.into(),
        }
    }
}

/// Deterministic synthesized insights, in fixed template order.
fn synthesized(subject: &SubjectProfile) -> [String; INSIGHT_COUNT] {
    [
        format!(
            "{} is currently listed as {} in the knowledge graph.",
            subject.name, subject.status
        ),
        format!("{} belongs to the {} species.", subject.name, subject.species),
        format!("{} can be traced back to {}.", subject.name, subject.origin),
        format!(
            "Records about {} are still being cross-referenced across dimensions.",
            subject.name
        ),
        format!(
            "The archive considers {} a notable entry worth revisiting.",
            subject.name
        ),
    ]
}

/// Keep the first five extracted insights; pad from templates when short.
///
/// Extracted entries form a stable prefix; synthesized entries are appended
/// in template order and never inserted before a real one.
#[must_use]
pub fn pad_insights(mut items: Vec<String>, subject: &SubjectProfile) -> Vec<String> {
    items.truncate(INSIGHT_COUNT);
    if items.len() < INSIGHT_COUNT {
        let missing = INSIGHT_COUNT - items.len();
        debug!(extracted = items.len(), missing, "padding insight list");
        for template in synthesized(subject) {
            if items.len() == INSIGHT_COUNT {
                break;
            }
            // A template that duplicates an extracted entry is skipped.
            if !items.contains(&template) {
                items.push(template);
            }
        }
    }
    items
}
