//! Upstream model capabilities: text generation and text embedding.
//!
//! Both capabilities are traits so the pipeline can be exercised against
//! deterministic doubles ([`mock`]) or a real HTTP backend ([`gemini`]).
//! Neither trait retries; a failed call surfaces as
//! [`CoreError::Upstream`](crate::error::CoreError) and recovery, where it
//! exists, happens downstream (fallback text for some flows, the extraction
//! cascade for structured output).

pub mod gemini;
pub mod mock;

use async_trait::async_trait;

use crate::error::CoreError;

pub use gemini::GeminiProvider;
pub use mock::{MockEmbeddingProvider, MockGenerationProvider};

/// One generation call: prompts in, generated text out.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: String,
    pub temperature: f64,
}

impl GenerationRequest {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            model: String::new(),
            temperature: 0.7,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Text generation capability.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Produce text for the given request.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Upstream`] if the backend is unreachable or
    /// rejects the call. Never retried here.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, CoreError>;
}

/// Text embedding capability.
///
/// Implementations return the raw vector as delivered by the backend; the
/// dimension-fitting postcondition lives in
/// [`EmbeddingGenerator`](crate::search::embedding::EmbeddingGenerator).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed `text` into a numeric vector.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Upstream`] on call failure, or
    /// [`CoreError::EmbeddingShape`] if the response carries no locatable
    /// numeric array.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CoreError>;
}
