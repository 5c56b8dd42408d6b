//! Text-to-items conversion for list-valued sections.
//!
//! Splits a section's text on a family of bullet/number/emoji markers,
//! drops fragments below a minimum length, and excludes bare
//! discourse-connective fragments. When no markers are present the text is
//! split into sentences instead, so prose-only sections still yield items.

use regex::Regex;
use std::sync::LazyLock;

/// Items shorter than this (after trimming) are dropped as noise.
pub const MIN_ITEM_LEN: usize = 10;

/// Discourse connectives that sometimes survive splitting as lone fragments.
const STOPLIST: &[&str] = &[
    "however",
    "therefore",
    "moreover",
    "furthermore",
    "additionally",
    "meanwhile",
    "in conclusion",
    "on the other hand",
    "that said",
    "overall",
];

static BULLET_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:[-*•‣▪]|\d{1,2}[\.\)]|[✅✔☑️💡⭐🔹👉→➤–])\s+")
        .expect("bullet marker pattern must compile")
});

static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[.!?]+(?:\s+|$)").expect("sentence end pattern must compile")
});

/// Split section text into cleaned list items.
///
/// Marker-delimited splitting is preferred; sentence splitting is the
/// fallback when no marker is found anywhere in the text.
#[must_use]
pub fn split_items(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let marker_positions: Vec<(usize, usize)> = BULLET_MARKER
        .find_iter(trimmed)
        .map(|m| (m.start(), m.end()))
        .collect();

    let raw: Vec<&str> = if marker_positions.is_empty() {
        split_sentences(trimmed)
    } else {
        let mut pieces = Vec::with_capacity(marker_positions.len() + 1);
        // Text before the first marker is usually a lead-in; keep it so a
        // meaningful preamble is not lost, the length filter drops chaff.
        if marker_positions[0].0 > 0 {
            pieces.push(&trimmed[..marker_positions[0].0]);
        }
        for (i, (_, end)) in marker_positions.iter().enumerate() {
            let next = marker_positions
                .get(i + 1)
                .map_or(trimmed.len(), |(start, _)| *start);
            pieces.push(&trimmed[*end..next]);
        }
        pieces
    };

    raw.into_iter()
        .map(clean_item)
        .filter(|item| item.len() >= MIN_ITEM_LEN && !is_connective(item))
        .collect()
}

fn split_sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        out.push(&text[start..m.start() + 1]);
        start = m.end();
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

fn clean_item(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(|c: char| c == ';' || c == ',')
        .trim()
        .to_string()
}

fn is_connective(item: &str) -> bool {
    let normalized: String = item
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    let normalized = normalized.trim();
    STOPLIST.iter().any(|stop| normalized == *stop)
}
