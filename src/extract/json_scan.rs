//! JSON recovery from generated text.
//!
//! Entry points matching the first two cascade tiers: a strict parse of the
//! (fence-stripped) whole text, and bracket-matched scans that dig the first
//! well-formed JSON object — or, for list-shaped kinds, array — out of
//! surrounding prose.

use serde_json::Value;

/// Strip at most one leading and one trailing fenced-code-block delimiter.
///
/// Handles ```` ```json ```` / ```` ``` ```` fences; anything inside is left
/// untouched. Unfenced text is returned as-is.
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line. The tag is
    // trimmed so CRLF line endings do not defeat the check.
    let rest = match rest.find('\n') {
        Some(newline)
            if rest[..newline]
                .trim_end()
                .chars()
                .all(|c| c.is_ascii_alphanumeric()) =>
        {
            &rest[newline + 1..]
        }
        _ => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Tier 1: parse the whole trimmed text as a JSON object or array.
///
/// Scalar documents are rejected; the driver decides whether the parsed
/// shape fits the requested kind.
#[must_use]
pub fn parse_strict(text: &str) -> Option<Value> {
    let candidate = strip_code_fence(text);
    let value: Value = serde_json::from_str(candidate).ok()?;
    (value.is_object() || value.is_array()).then_some(value)
}

/// Tier 2: locate the first well-formed JSON object embedded in prose.
///
/// Scans for `{`, tracks brace depth while honoring string literals and
/// escapes, and attempts a parse at each balanced close. A candidate that
/// balances but fails to parse does not stop the scan; the search resumes
/// at the next opening brace.
#[must_use]
pub fn find_embedded_object(text: &str) -> Option<Value> {
    find_embedded(text, b'{', b'}', Value::is_object)
}

/// Tier 2, list-shaped kinds: locate the first well-formed JSON array
/// embedded in prose. Same scan discipline as [`find_embedded_object`].
#[must_use]
pub fn find_embedded_array(text: &str) -> Option<Value> {
    find_embedded(text, b'[', b']', Value::is_array)
}

fn find_embedded(
    text: &str,
    open_byte: u8,
    close_byte: u8,
    accepts: fn(&Value) -> bool,
) -> Option<Value> {
    let bytes = text.as_bytes();
    let mut start = 0;
    while let Some(open) = text[start..].find(char::from(open_byte)) {
        let open = start + open;
        if let Some(end) = balanced_end(bytes, open, open_byte, close_byte) {
            if let Ok(value) = serde_json::from_str::<Value>(&text[open..=end]) {
                if accepts(&value) {
                    return Some(value);
                }
            }
        }
        start = open + 1;
    }
    None
}

/// Index of the byte closing the delimiter opened at `open`, if balanced.
fn balanced_end(bytes: &[u8], open: usize, open_byte: u8, close_byte: u8) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        if b == b'"' {
            in_string = true;
        } else if b == open_byte {
            depth += 1;
        } else if b == close_byte {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}
