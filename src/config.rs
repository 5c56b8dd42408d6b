//! Immutable pipeline configuration.
//!
//! One [`PipelineConfig`] value is constructed at startup and threaded
//! through the pipeline by explicit parameter passing — there is no global
//! registry. Prompt selection is the closed [`PromptKind`] enum, resolved
//! entirely at configuration build time: every template is validated
//! against its allowed placeholder set before the first request, so an
//! unknown placeholder is a startup error, never a per-call branch.
//!
//! Resolution order (later wins):
//!
//! 1. Compiled defaults
//! 2. Environment variables (`LOREWEAVE_*`), when enabled

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::types::EMBEDDING_DIM;

/// Errors raised while building or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A template references a placeholder its kind does not provide.
    #[error("template for {kind:?} references unknown placeholder '{{{placeholder}}}'")]
    UnknownPlaceholder {
        kind: PromptKind,
        placeholder: String,
    },

    /// A template is empty or whitespace-only.
    #[error("template for {kind:?} is empty")]
    EmptyTemplate { kind: PromptKind },

    /// Environment variable parsing error.
    #[error("failed to parse environment variable {key}: {message}")]
    EnvParse { key: String, message: String },
}

/// The closed set of prompt templates the pipeline can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKind {
    /// Expand a short query into a richer search phrase.
    QueryExpansion,
    /// Describe a single entity.
    Description,
    /// Analyze how two characters work together.
    Compatibility,
    /// Grade a generated answer.
    Evaluation,
    /// Produce five insights about an entity.
    Insights,
}

impl PromptKind {
    /// All kinds, for eager load-time validation.
    pub const ALL: [PromptKind; 5] = [
        Self::QueryExpansion,
        Self::Description,
        Self::Compatibility,
        Self::Evaluation,
        Self::Insights,
    ];

    /// Placeholders a template of this kind may reference.
    #[must_use]
    pub fn allowed_placeholders(self) -> &'static [&'static str] {
        match self {
            Self::QueryExpansion => &["query"],
            Self::Description => &["profile"],
            Self::Compatibility => &["left", "right", "location"],
            Self::Evaluation => &["question", "answer"],
            Self::Insights => &["profile"],
        }
    }
}

/// A validated prompt template with `{name}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    kind: PromptKind,
    text: String,
}

impl PromptTemplate {
    /// Validate `text` against the placeholder set of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the template is empty or references a
    /// placeholder the kind does not provide.
    pub fn new(kind: PromptKind, text: impl Into<String>) -> Result<Self, ConfigError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ConfigError::EmptyTemplate { kind });
        }
        for placeholder in extract_placeholders(&text) {
            if !kind.allowed_placeholders().contains(&placeholder.as_str()) {
                return Err(ConfigError::UnknownPlaceholder { kind, placeholder });
            }
        }
        Ok(Self { kind, text })
    }

    #[must_use]
    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    /// Substitute placeholders with the supplied values.
    ///
    /// Placeholders absent from `values` render as empty strings; validation
    /// at build time guarantees only allowed names appear in the template.
    #[must_use]
    pub fn render(&self, values: &[(&str, &str)]) -> String {
        let mut out = self.text.clone();
        for name in self.kind.allowed_placeholders() {
            let value = values
                .iter()
                .find(|(k, _)| k == name)
                .map_or("", |(_, v)| *v);
            out = out.replace(&format!("{{{name}}}"), value);
        }
        out
    }
}

/// Scan `{name}` occurrences in a template.
fn extract_placeholders(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    found.push(name.to_string());
                }
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    found
}

// ── PipelineConfig ─────────────────────────────────────────────────────

/// Immutable configuration threaded through the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Model identifier for generation calls.
    pub generation_model: String,
    /// Model identifier for embedding calls.
    pub embedding_model: String,
    /// Sampling temperature for generation calls.
    pub temperature: f64,
    /// Required vector dimensionality of the datastore.
    pub embedding_dim: usize,
    /// Default number of ranked results.
    pub search_limit: usize,
    templates: FxHashMap<PromptKind, PromptTemplate>,
}

impl PipelineConfig {
    /// Start building a configuration from compiled defaults.
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// The validated template for `kind`.
    ///
    /// Build-time validation guarantees every kind is present.
    #[must_use]
    pub fn template(&self, kind: PromptKind) -> &PromptTemplate {
        &self.templates[&kind]
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    generation_model: String,
    embedding_model: String,
    temperature: f64,
    search_limit: usize,
    overrides: Vec<(PromptKind, String)>,
    use_env: bool,
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self {
            generation_model: "gemini-2.0-flash".to_string(),
            embedding_model: "text-embedding-004".to_string(),
            temperature: 0.7,
            search_limit: 6,
            overrides: Vec::new(),
            use_env: false,
        }
    }
}

impl PipelineConfigBuilder {
    /// Override the generation model identifier.
    #[must_use]
    pub fn generation_model(mut self, model: impl Into<String>) -> Self {
        self.generation_model = model.into();
        self
    }

    /// Override the embedding model identifier.
    #[must_use]
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Set the generation sampling temperature.
    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the default ranked-result limit.
    #[must_use]
    pub fn search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// Replace the template text for one prompt kind.
    #[must_use]
    pub fn template(mut self, kind: PromptKind, text: impl Into<String>) -> Self {
        self.overrides.push((kind, text.into()));
        self
    }

    /// Enable `LOREWEAVE_*` environment overrides (loads `.env` if present).
    ///
    /// Recognised: `LOREWEAVE_GENERATION_MODEL`, `LOREWEAVE_EMBEDDING_MODEL`,
    /// `LOREWEAVE_TEMPERATURE`, `LOREWEAVE_SEARCH_LIMIT`.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        self.use_env = true;
        self
    }

    /// Build and validate the final configuration.
    ///
    /// Every prompt kind gets a template here; all templates are validated
    /// eagerly so a bad placeholder fails at startup rather than at call
    /// time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on invalid templates or unparseable
    /// environment overrides.
    pub fn build(mut self) -> Result<PipelineConfig, ConfigError> {
        if self.use_env {
            dotenvy::dotenv().ok();

            if let Ok(model) = std::env::var("LOREWEAVE_GENERATION_MODEL") {
                self.generation_model = model;
            }
            if let Ok(model) = std::env::var("LOREWEAVE_EMBEDDING_MODEL") {
                self.embedding_model = model;
            }
            if let Ok(raw) = std::env::var("LOREWEAVE_TEMPERATURE") {
                self.temperature = raw.parse().map_err(|_| ConfigError::EnvParse {
                    key: "LOREWEAVE_TEMPERATURE".to_string(),
                    message: "must be a number".to_string(),
                })?;
            }
            if let Ok(raw) = std::env::var("LOREWEAVE_SEARCH_LIMIT") {
                self.search_limit = raw.parse().map_err(|_| ConfigError::EnvParse {
                    key: "LOREWEAVE_SEARCH_LIMIT".to_string(),
                    message: "must be a positive integer".to_string(),
                })?;
            }
        }

        let mut templates = FxHashMap::default();
        for kind in PromptKind::ALL {
            let text = self
                .overrides
                .iter()
                .rev()
                .find(|(k, _)| *k == kind)
                .map_or_else(|| default_template(kind).to_string(), |(_, t)| t.clone());
            templates.insert(kind, PromptTemplate::new(kind, text)?);
        }

        Ok(PipelineConfig {
            generation_model: self.generation_model,
            embedding_model: self.embedding_model,
            temperature: self.temperature,
            embedding_dim: EMBEDDING_DIM,
            search_limit: self.search_limit,
            templates,
        })
    }
}

/// Compiled default template text per kind.
fn default_template(kind: PromptKind) -> &'static str {
    match kind {
        PromptKind::QueryExpansion => {
            "Expand the search query \"{query}\" into one richer descriptive phrase \
             covering likely traits, species, and places. Reply with the phrase only."
        }
        PromptKind::Description => {
            "Write a short in-universe description of this entity.\n\n{profile}"
        }
        PromptKind::Compatibility => {
            "Analyze how these two characters would work together at {location}.\n\
             First: {left}\nSecond: {right}\n\
             Cover teamwork strengths, likely conflicts, and who breaks first."
        }
        PromptKind::Evaluation => {
            "Grade the answer below against the question. Report factual checks, \
             quality checks, a 0-10 score, and a short explanation.\n\
             Question: {question}\nAnswer: {answer}"
        }
        PromptKind::Insights => {
            "List exactly five surprising insights about this entity.\n\n{profile}"
        }
    }
}
