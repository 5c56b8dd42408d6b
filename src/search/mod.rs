//! The semantic search pipeline: enhance → embed → rank.
//!
//! Stages run sequentially because each depends on the previous result.
//! The pipeline holds no state across requests; the only shared resource is
//! the backend's connection pool.

pub mod embedding;
pub mod enhancer;

use tracing::{debug, instrument};

use crate::config::PipelineConfig;
use crate::error::CoreError;
use crate::providers::{EmbeddingProvider, GenerationProvider};
use crate::stores::VectorBackend;
use crate::types::SearchResult;

pub use embedding::{EmbeddingGenerator, fit_dimension};
pub use enhancer::QueryEnhancer;

/// End-to-end semantic search over the entity store.
pub struct SearchPipeline<'a, B: VectorBackend> {
    generation: &'a dyn GenerationProvider,
    embedding: &'a dyn EmbeddingProvider,
    backend: &'a B,
    config: &'a PipelineConfig,
}

impl<'a, B: VectorBackend> SearchPipeline<'a, B> {
    #[must_use]
    pub fn new(
        generation: &'a dyn GenerationProvider,
        embedding: &'a dyn EmbeddingProvider,
        backend: &'a B,
        config: &'a PipelineConfig,
    ) -> Self {
        Self {
            generation,
            embedding,
            backend,
            config,
        }
    }

    /// Search with the configured default result limit.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, CoreError> {
        self.search_with_limit(query, self.config.search_limit).await
    }

    /// Enhance `query` if terse, embed it, and rank the store's entities.
    ///
    /// # Errors
    ///
    /// Propagates failures from any stage; there are no internal retries or
    /// fallbacks on this path.
    #[instrument(skip(self))]
    pub async fn search_with_limit(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SearchResult>, CoreError> {
        if query.trim().is_empty() {
            return Err(CoreError::MissingInput { what: "query" });
        }

        let enhanced = QueryEnhancer::new(self.generation, self.config)
            .enhance(query)
            .await?;
        let vector = EmbeddingGenerator::with_dim(self.embedding, self.config.embedding_dim)
            .embed(&enhanced)
            .await?;
        let results = self.backend.rank_by_distance(&vector, limit).await?;
        debug!(hits = results.len(), "search complete");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{MockEmbeddingProvider, MockGenerationProvider};
    use crate::stores::MemoryVectorStore;
    use crate::types::{CharacterAttrs, Entity, EntityAttrs};

    #[tokio::test]
    async fn empty_query_is_rejected_at_the_boundary() {
        let generation = MockGenerationProvider::new();
        let embedding = MockEmbeddingProvider::new();
        let backend = MemoryVectorStore::new();
        let config = PipelineConfig::builder().build().unwrap();
        let pipeline = SearchPipeline::new(&generation, &embedding, &backend, &config);

        let err = pipeline.search("  ").await.unwrap_err();
        assert!(matches!(err, CoreError::MissingInput { what: "query" }));
    }

    #[tokio::test]
    async fn search_ranks_seeded_entities() {
        let generation = MockGenerationProvider::with_responses(["a green alien scientist"]);
        let embedding = MockEmbeddingProvider::new();
        let backend = MemoryVectorStore::new();
        let config = PipelineConfig::builder().build().unwrap();

        for (id, name) in [(1, "Rick"), (2, "Birdperson")] {
            let entity = Entity {
                id,
                name: name.into(),
                attrs: EntityAttrs::Character(CharacterAttrs::default()),
            };
            let vector = embedding.embed(&entity.profile_text()).await.unwrap();
            backend.upsert(&entity, &vector).await.unwrap();
        }

        let pipeline = SearchPipeline::new(&generation, &embedding, &backend, &config);
        let results = pipeline.search("alien").await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].distance <= results[1].distance);
        // The short query went through the enhancer exactly once.
        assert_eq!(generation.calls().len(), 1);
    }
}
