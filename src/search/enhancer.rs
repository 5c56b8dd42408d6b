//! Short-query enhancement.
//!
//! One- and two-word queries carry too little signal for useful embedding
//! similarity, so they are expanded into a richer phrase by a generation
//! call before embedding. Longer queries pass through untouched.

use tracing::{debug, instrument};

use crate::config::{PipelineConfig, PromptKind};
use crate::error::CoreError;
use crate::providers::{GenerationProvider, GenerationRequest};

/// Word-count threshold at or below which a query gets expanded.
const EXPANSION_THRESHOLD: usize = 2;

/// Expands terse queries via the generation capability.
pub struct QueryEnhancer<'a> {
    provider: &'a dyn GenerationProvider,
    config: &'a PipelineConfig,
}

impl<'a> QueryEnhancer<'a> {
    #[must_use]
    pub fn new(provider: &'a dyn GenerationProvider, config: &'a PipelineConfig) -> Self {
        Self { provider, config }
    }

    /// Return an enriched query phrase for short inputs, or the input
    /// unchanged otherwise.
    ///
    /// Empty and whitespace-only inputs are returned unchanged; there is
    /// nothing to expand.
    ///
    /// # Errors
    ///
    /// Propagates [`CoreError::Upstream`] from the generation call. No
    /// internal fallback: a failed expansion is the caller's problem.
    #[instrument(skip_all, fields(query = %query))]
    pub async fn enhance(&self, query: &str) -> Result<String, CoreError> {
        let trimmed = query.trim();
        let words = trimmed.split_whitespace().count();
        if words == 0 || words > EXPANSION_THRESHOLD {
            return Ok(query.to_string());
        }

        let prompt = self
            .config
            .template(PromptKind::QueryExpansion)
            .render(&[("query", trimmed)]);
        let request = GenerationRequest::new(
            "You enrich terse search queries for semantic retrieval.",
            prompt,
        )
        .with_model(self.config.generation_model.clone())
        .with_temperature(self.config.temperature);

        let expanded = self.provider.generate(&request).await?;
        let expanded = expanded.trim().to_string();
        debug!(expanded = %expanded, "query enhanced");
        Ok(expanded)
    }
}
