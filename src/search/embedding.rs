//! Embedding generation with dimension fitting.
//!
//! Wraps an [`EmbeddingProvider`] and enforces the datastore's fixed-length
//! postcondition on the way out: vectors longer than the configured
//! dimension are truncated to their first `dim` elements, order preserved.
//!
//! Shorter vectors are currently passed through **unchanged** and logged at
//! `warn`. Whether they should be zero-padded is an open product question;
//! the store rejects them at upsert time with a dimension error, so the
//! mismatch is loud rather than silently corrupting the index.

use tracing::{instrument, warn};

use crate::error::CoreError;
use crate::providers::EmbeddingProvider;
use crate::types::EMBEDDING_DIM;

/// Truncate `vector` to at most `dim` elements, preserving order.
///
/// Shorter vectors are returned as-is (see module docs).
#[must_use]
pub fn fit_dimension(mut vector: Vec<f32>, dim: usize) -> Vec<f32> {
    if vector.len() > dim {
        vector.truncate(dim);
    } else if vector.len() < dim {
        warn!(
            got = vector.len(),
            want = dim,
            "embedding shorter than store dimension; passing through unpadded"
        );
    }
    vector
}

/// Text-to-vector front end of the search pipeline.
pub struct EmbeddingGenerator<'a> {
    provider: &'a dyn EmbeddingProvider,
    dim: usize,
}

impl<'a> EmbeddingGenerator<'a> {
    #[must_use]
    pub fn new(provider: &'a dyn EmbeddingProvider) -> Self {
        Self {
            provider,
            dim: EMBEDDING_DIM,
        }
    }

    /// Generator with a non-standard target dimension.
    #[must_use]
    pub fn with_dim(provider: &'a dyn EmbeddingProvider, dim: usize) -> Self {
        Self { provider, dim }
    }

    /// Embed `text` and fit the result to the store dimension.
    ///
    /// # Errors
    ///
    /// Propagates [`CoreError::Upstream`] and [`CoreError::EmbeddingShape`]
    /// from the provider. Not retried.
    #[instrument(skip_all, fields(text_len = text.len()))]
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, CoreError> {
        let vector = self.provider.embed(text).await?;
        Ok(fit_dimension(vector, self.dim))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::MockEmbeddingProvider;

    #[test]
    fn long_vector_truncated_to_prefix() {
        let input: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let fitted = fit_dimension(input.clone(), 4);
        assert_eq!(fitted, &input[..4]);
    }

    #[test]
    fn exact_vector_untouched() {
        let input = vec![1.0, 2.0, 3.0];
        assert_eq!(fit_dimension(input.clone(), 3), input);
    }

    #[test]
    fn short_vector_passed_through_unpadded() {
        let input = vec![1.0, 2.0];
        assert_eq!(fit_dimension(input.clone(), 768), input);
    }

    #[tokio::test]
    async fn embed_truncates_provider_output() {
        let provider = MockEmbeddingProvider::with_dims(1000);
        let generator = EmbeddingGenerator::new(&provider);
        let vector = generator.embed("alien").await.unwrap();
        assert_eq!(vector.len(), EMBEDDING_DIM);

        let raw = provider.embed("alien").await.unwrap();
        assert_eq!(vector, &raw[..EMBEDDING_DIM]);
    }
}
