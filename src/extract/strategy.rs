//! The ordered parse cascade.
//!
//! One list of strategy objects, applied in priority order, replaces the
//! per-kind regex pyramids such pipelines tend to grow. A strategy either
//! declines (`None`) or produces a [`TierOutcome`]; the terminal
//! [`PositionalPartition`] never declines, which is what makes the whole
//! cascade infallible.

use tracing::trace;

use super::json_scan;
use super::sections::{SectionSpec, compiled_sections};
use crate::types::DocumentKind;

/// What a successful tier hands back to the driver.
#[derive(Debug)]
pub enum TierOutcome {
    /// A parsed JSON document (tiers 1–2); the driver checks schema fit.
    Json(serde_json::Value),
    /// Per-section text, aligned with the kind's section specs (tiers 3–5).
    Sections(Vec<String>),
}

/// A single parsing strategy in the cascade.
pub trait ParseStrategy: Send + Sync {
    /// Identifier used in trace output.
    fn name(&self) -> &'static str;

    /// Attempt to interpret `text`; `None` passes control to the next tier.
    fn apply(&self, text: &str, kind: DocumentKind, specs: &[SectionSpec]) -> Option<TierOutcome>;
}

/// The cascade, in priority order. The last entry always succeeds.
pub(crate) static CASCADE: [&(dyn ParseStrategy); 5] = [
    &StrictJson,
    &EmbeddedJson,
    &LabeledSections,
    &ParagraphHeuristic,
    &PositionalPartition,
];

// ── Tier 1: strict JSON ────────────────────────────────────────────────

/// Parse the whole trimmed text (minus one code fence) as a JSON document.
pub struct StrictJson;

impl ParseStrategy for StrictJson {
    fn name(&self) -> &'static str {
        "strict_json"
    }

    fn apply(&self, text: &str, _kind: DocumentKind, _specs: &[SectionSpec]) -> Option<TierOutcome> {
        json_scan::parse_strict(text).map(TierOutcome::Json)
    }
}

// ── Tier 2: embedded JSON ──────────────────────────────────────────────

/// Bracket-matched scan for the first well-formed object inside prose; for
/// the list-shaped insights kind a top-level array is also recognized.
pub struct EmbeddedJson;

impl ParseStrategy for EmbeddedJson {
    fn name(&self) -> &'static str {
        "embedded_json"
    }

    fn apply(&self, text: &str, kind: DocumentKind, _specs: &[SectionSpec]) -> Option<TierOutcome> {
        if let Some(value) = json_scan::find_embedded_object(text) {
            return Some(TierOutcome::Json(value));
        }
        if kind == DocumentKind::Insights {
            return json_scan::find_embedded_array(text).map(TierOutcome::Json);
        }
        None
    }
}

// ── Tier 3: labeled sections ───────────────────────────────────────────

/// Recognize per-section headers (keyword, numbered, emoji synonyms) and
/// capture each section lazily up to the next recognized header.
pub struct LabeledSections;

impl ParseStrategy for LabeledSections {
    fn name(&self) -> &'static str {
        "labeled_sections"
    }

    fn apply(&self, text: &str, kind: DocumentKind, specs: &[SectionSpec]) -> Option<TierOutcome> {
        let compiled = compiled_sections(kind);

        // Every header hit in the text: (byte offset of header start,
        // byte offset of content start, section index).
        let mut hits: Vec<(usize, usize, usize)> = Vec::new();
        for (section_idx, patterns) in compiled.headers.iter().enumerate() {
            for re in patterns {
                for m in re.find_iter(text) {
                    hits.push((m.start(), m.end(), section_idx));
                }
            }
        }
        hits.sort_by_key(|(start, _, _)| *start);

        let mut captured: Vec<Option<String>> = vec![None; specs.len()];
        for (i, (_, content_start, section_idx)) in hits.iter().enumerate() {
            let content_end = hits.get(i + 1).map_or(text.len(), |(next, _, _)| *next);
            // Headers match up to the recognizing token; shed the leftover
            // punctuation (":", "?", bold markers) before the content proper.
            let content = text[*content_start..content_end]
                .trim_start_matches(|c: char| {
                    c.is_whitespace() || matches!(c, ':' | '?' | '!' | '.' | ')' | '*' | '-' | '–' | '—')
                })
                .trim_end();
            // First header wins; repeated headers for a section are ignored.
            let slot = &mut captured[*section_idx];
            if slot.is_none() && !content.is_empty() {
                *slot = Some(content.to_string());
            }
        }

        let found = captured.iter().filter(|c| c.is_some()).count();
        let required = required_sections(specs.len());
        if found < required {
            return None;
        }
        trace!(found, total = specs.len(), "labeled sections recognized");
        Some(TierOutcome::Sections(
            captured.into_iter().map(Option::unwrap_or_default).collect(),
        ))
    }
}

/// How many recognized sections a text tier needs before claiming success.
fn required_sections(total: usize) -> usize {
    if total > 1 { 2 } else { 1 }
}

// ── Tier 4: paragraph heuristic ────────────────────────────────────────

/// Split on blank lines / horizontal rules and assign each paragraph to the
/// section whose keyword set it best matches; unmatched paragraphs are
/// assigned by position.
pub struct ParagraphHeuristic;

impl ParseStrategy for ParagraphHeuristic {
    fn name(&self) -> &'static str {
        "paragraph_heuristic"
    }

    fn apply(&self, text: &str, _kind: DocumentKind, specs: &[SectionSpec]) -> Option<TierOutcome> {
        let paragraphs = split_paragraphs(text);
        if paragraphs.len() < required_sections(specs.len()) {
            return None;
        }

        let mut buckets: Vec<Vec<&str>> = vec![Vec::new(); specs.len()];
        let total = paragraphs.len();
        for (idx, paragraph) in paragraphs.iter().enumerate() {
            let target = match best_section(paragraph, specs) {
                Some(section_idx) => section_idx,
                // Positional assignment: spread unmatched paragraphs
                // proportionally across the expected sections.
                None => idx * specs.len() / total,
            };
            buckets[target].push(paragraph);
        }

        Some(TierOutcome::Sections(
            buckets.into_iter().map(|b| b.join("\n\n")).collect(),
        ))
    }
}

fn split_paragraphs(text: &str) -> Vec<&str> {
    text.split("\n\n")
        .flat_map(|block| block.split("\n---"))
        .map(str::trim)
        .filter(|p| !p.is_empty() && !p.chars().all(|c| c == '-' || c.is_whitespace()))
        .collect()
}

/// Section whose keyword set scores highest for this paragraph, if any
/// keyword matches at all.
fn best_section(paragraph: &str, specs: &[SectionSpec]) -> Option<usize> {
    let lower = paragraph.to_lowercase();
    let mut best: Option<(usize, usize)> = None;
    for (idx, spec) in specs.iter().enumerate() {
        let score: usize = spec
            .keywords
            .iter()
            .map(|kw| lower.matches(kw).count())
            .sum();
        if score > 0 && best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((idx, score));
        }
    }
    best.map(|(idx, _)| idx)
}

// ── Tier 5: positional fallback ────────────────────────────────────────

/// Partition the full text into N equal-length character ranges.
///
/// This tier always succeeds; it is the cascade's terminal guarantee.
/// Concatenating the partitions reconstructs the input exactly.
pub struct PositionalPartition;

impl ParseStrategy for PositionalPartition {
    fn name(&self) -> &'static str {
        "positional_partition"
    }

    fn apply(&self, text: &str, _kind: DocumentKind, specs: &[SectionSpec]) -> Option<TierOutcome> {
        Some(TierOutcome::Sections(partition_equal(text, specs.len())))
    }
}

/// Split `text` into `n` contiguous ranges of (near-)equal character count.
///
/// Ranges respect char boundaries; lengths differ by at most one character,
/// with the remainder distributed to the leading partitions.
#[must_use]
pub fn partition_equal(text: &str, n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let base = total / n;
    let remainder = total % n;

    let mut out = Vec::with_capacity(n);
    let mut cursor = 0;
    for i in 0..n {
        let len = base + usize::from(i < remainder);
        out.push(chars[cursor..cursor + len].iter().collect());
        cursor += len;
    }
    out
}
