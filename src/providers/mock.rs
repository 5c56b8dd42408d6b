//! Deterministic provider doubles for tests and offline demos.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{EmbeddingProvider, GenerationProvider, GenerationRequest};
use crate::error::CoreError;
use crate::types::EMBEDDING_DIM;

/// Generation double that replays canned responses in order.
///
/// When the queue is exhausted it echoes the user prompt, so open-ended
/// tests keep working. Configure a failure to exercise propagation paths.
#[derive(Debug, Default)]
pub struct MockGenerationProvider {
    responses: Mutex<Vec<String>>,
    fail_with: Option<String>,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl MockGenerationProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue canned responses, replayed first-in first-out.
    #[must_use]
    pub fn with_responses(responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut queued: Vec<String> = responses.into_iter().map(Into::into).collect();
        queued.reverse();
        Self {
            responses: Mutex::new(queued),
            ..Self::default()
        }
    }

    /// Make every call fail with the given message.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    /// Requests observed so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }
}

#[async_trait]
impl GenerationProvider for MockGenerationProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, CoreError> {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(request.clone());
        if let Some(message) = &self.fail_with {
            return Err(CoreError::generation(message.clone()));
        }
        let mut queue = self.responses.lock().expect("responses mutex poisoned");
        Ok(queue
            .pop()
            .unwrap_or_else(|| request.user_prompt.clone()))
    }
}

/// Embedding double producing stable, text-dependent vectors.
///
/// The vector is a deterministic function of the input bytes, so equal texts
/// embed identically and different texts almost surely differ. Dimension is
/// configurable to exercise the truncation/short-vector paths.
#[derive(Debug, Clone)]
pub struct MockEmbeddingProvider {
    dims: usize,
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self {
            dims: EMBEDDING_DIM,
        }
    }
}

impl MockEmbeddingProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce vectors of a non-standard length.
    #[must_use]
    pub fn with_dims(dims: usize) -> Self {
        Self { dims }
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CoreError> {
        // FNV-style rolling hash seeds each component.
        let mut state: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in text.bytes() {
            state ^= u64::from(byte);
            state = state.wrapping_mul(0x0000_0100_0000_01b3);
        }
        let mut vector = Vec::with_capacity(self.dims);
        for i in 0..self.dims {
            let mixed = state.wrapping_add(i as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
            // Map into [-1, 1).
            vector.push(((mixed >> 11) as f32 / (1u64 << 53) as f32).mul_add(2.0, -1.0));
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generation_replays_in_order_then_echoes() {
        let provider = MockGenerationProvider::with_responses(["first", "second"]);
        let request = GenerationRequest::new("sys", "prompt");
        assert_eq!(provider.generate(&request).await.unwrap(), "first");
        assert_eq!(provider.generate(&request).await.unwrap(), "second");
        assert_eq!(provider.generate(&request).await.unwrap(), "prompt");
        assert_eq!(provider.calls().len(), 3);
    }

    #[tokio::test]
    async fn failing_generation_propagates() {
        let provider = MockGenerationProvider::failing("down");
        let err = provider
            .generate(&GenerationRequest::new("s", "u"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("down"));
    }

    #[tokio::test]
    async fn embeddings_are_deterministic_per_text() {
        let provider = MockEmbeddingProvider::new();
        let a = provider.embed("alien").await.unwrap();
        let b = provider.embed("alien").await.unwrap();
        let c = provider.embed("robot").await.unwrap();
        assert_eq!(a.len(), EMBEDDING_DIM);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[tokio::test]
    async fn custom_dimension_respected() {
        let provider = MockEmbeddingProvider::with_dims(16);
        assert_eq!(provider.embed("x").await.unwrap().len(), 16);
    }
}
