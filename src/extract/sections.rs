//! Static section specifications for the labeled text tiers.
//!
//! Each document kind names its expected sections once, with the header
//! synonyms (keyword headers, numbered headers, emoji markers) and the
//! keyword sets the paragraph-assignment tier scores against. Regexes are
//! compiled lazily, once per process, in the same style as this crate's
//! other static pattern tables.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::DocumentKind;

/// One expected section of a document kind.
#[derive(Debug)]
pub struct SectionSpec {
    /// Canonical key, also the JSON field this section feeds.
    pub key: &'static str,
    /// Header recognizers, matched at line starts (case-insensitive).
    pub header_patterns: &'static [&'static str],
    /// Lowercase keywords for the paragraph-assignment heuristic.
    pub keywords: &'static [&'static str],
}

/// Helper to keep the static tables compact.
macro_rules! section {
    ($key:expr, [$($hdr:expr),+ $(,)?], [$($kw:expr),* $(,)?]) => {
        SectionSpec {
            key: $key,
            header_patterns: &[$($hdr),+],
            keywords: &[$($kw),*],
        }
    };
}

static COMPATIBILITY_SECTIONS: [SectionSpec; 3] = [
    section!(
        "teamWork",
        [
            r"(?im)^\s*(?:#+\s*)?(?:\*\*)?\s*(?:1[\.\):]|team\s*work|working\s+together|synerg\w+|strengths?\b|🤝|💪)",
        ],
        ["team", "together", "synergy", "cooperate", "complement", "strength", "combine"]
    ),
    section!(
        "conflicts",
        [
            r"(?im)^\s*(?:#+\s*)?(?:\*\*)?\s*(?:2[\.\):]|conflicts?\b|clash\w*|frictions?\b|tensions?\b|disagree\w*|⚔️|💥)",
        ],
        ["conflict", "clash", "friction", "argue", "tension", "disagree", "rivalry", "fight"]
    ),
    section!(
        "breaksFirst",
        [
            r"(?im)^\s*(?:#+\s*)?(?:\*\*)?\s*(?:3[\.\):]|breaks?\s+first|who\s+breaks|cracks?\s+first|gives?\s+(?:up|in)|snaps?\s+first|🏳️|😤)",
        ],
        ["break", "breaks first", "crack", "give up", "give in", "snap", "collapse", "quit"]
    ),
];

static EVALUATION_SECTIONS: [SectionSpec; 3] = [
    section!(
        "checks",
        [
            r"(?im)^\s*(?:#+\s*)?(?:\*\*)?\s*(?:1[\.\):]|(?:factual\s+)?checks?\b|accuracy\b|facts?\b|✅|☑)",
        ],
        ["check", "mention", "accurate", "correct", "fact", "present"]
    ),
    section!(
        "qualityChecks",
        [
            r"(?im)^\s*(?:#+\s*)?(?:\*\*)?\s*(?:2[\.\):]|quality(?:\s+checks?)?\b|style\b|writing\b|⭐|✨)",
        ],
        ["quality", "coherent", "concise", "style", "tone", "readable", "clear"]
    ),
    section!(
        "verdict",
        [
            r"(?im)^\s*(?:#+\s*)?(?:\*\*)?\s*(?:3[\.\):]|scores?\b|ratings?\b|verdicts?\b|explanations?\b|summary\b|overall\b|📊|🏁)",
        ],
        ["score", "rating", "out of 10", "/10", "overall", "verdict", "explanation", "because"]
    ),
];

static INSIGHTS_SECTIONS: [SectionSpec; 1] = [section!(
    "insights",
    [
        r"(?im)^\s*(?:#+\s*)?(?:\*\*)?\s*(?:1[\.\):]|insights?\b|facts?\b|observations?\b|highlights?\b|💡|🔍)",
    ],
    ["insight", "fact", "interesting", "surprising", "notable", "observation"]
)];

/// The expected sections for `kind`, in output order.
#[must_use]
pub fn kind_sections(kind: DocumentKind) -> &'static [SectionSpec] {
    match kind {
        DocumentKind::Compatibility => &COMPATIBILITY_SECTIONS,
        DocumentKind::Evaluation => &EVALUATION_SECTIONS,
        DocumentKind::Insights => &INSIGHTS_SECTIONS,
    }
}

/// Compiled header regexes, one `Vec` per kind, built on first use.
pub(crate) struct CompiledSections {
    pub headers: Vec<Vec<Regex>>,
}

fn compile(specs: &'static [SectionSpec]) -> CompiledSections {
    CompiledSections {
        headers: specs
            .iter()
            .map(|spec| {
                spec.header_patterns
                    .iter()
                    .map(|p| Regex::new(p).expect("static section pattern must compile"))
                    .collect()
            })
            .collect(),
    }
}

static COMPATIBILITY_COMPILED: LazyLock<CompiledSections> =
    LazyLock::new(|| compile(&COMPATIBILITY_SECTIONS));
static EVALUATION_COMPILED: LazyLock<CompiledSections> =
    LazyLock::new(|| compile(&EVALUATION_SECTIONS));
static INSIGHTS_COMPILED: LazyLock<CompiledSections> =
    LazyLock::new(|| compile(&INSIGHTS_SECTIONS));

pub(crate) fn compiled_sections(kind: DocumentKind) -> &'static CompiledSections {
    match kind {
        DocumentKind::Compatibility => &COMPATIBILITY_COMPILED,
        DocumentKind::Evaluation => &EVALUATION_COMPILED,
        DocumentKind::Insights => &INSIGHTS_COMPILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_counts_match_kind_contract() {
        for kind in [
            DocumentKind::Compatibility,
            DocumentKind::Evaluation,
            DocumentKind::Insights,
        ] {
            assert_eq!(kind_sections(kind).len(), kind.section_count());
        }
    }

    #[test]
    fn all_patterns_compile() {
        for kind in [
            DocumentKind::Compatibility,
            DocumentKind::Evaluation,
            DocumentKind::Insights,
        ] {
            let compiled = compiled_sections(kind);
            assert_eq!(compiled.headers.len(), kind.section_count());
        }
    }

    #[test]
    fn teamwork_header_synonyms_match() {
        let compiled = compiled_sections(DocumentKind::Compatibility);
        for line in [
            "Teamwork:",
            "## Working Together",
            "1. They complement each other",
            "**Synergies**",
            "🤝 How they cooperate",
        ] {
            assert!(
                compiled.headers[0].iter().any(|re| re.is_match(line)),
                "expected teamwork header match for {line:?}"
            );
        }
    }

    #[test]
    fn breaks_first_header_synonyms_match() {
        let compiled = compiled_sections(DocumentKind::Compatibility);
        for line in ["Who breaks first?", "3) Breaks first", "Gives up:"] {
            assert!(
                compiled.headers[2].iter().any(|re| re.is_match(line)),
                "expected breaks-first header match for {line:?}"
            );
        }
    }

    #[test]
    fn headers_do_not_match_mid_line() {
        let compiled = compiled_sections(DocumentKind::Compatibility);
        assert!(
            !compiled.headers[1]
                .iter()
                .any(|re| re.is_match("they avoid conflict at work"))
        );
    }
}
