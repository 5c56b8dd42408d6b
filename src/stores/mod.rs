//! Vector datastore backends for entity embeddings.
//!
//! [`VectorBackend`] abstracts the two operations the pipeline needs from a
//! vector-indexed store: upserting an entity with its embedding, and ranking
//! entities by cosine distance to a query vector. Rankings merge both entity
//! variants into a single ordered list; the store never partitions by type.
//!
//! # Invariants
//!
//! - Any vector entering a store has exactly the store's configured
//!   dimension ([`ensure_dimension`] rejects everything else).
//! - Ranked results are ascending by distance; equal distances break on the
//!   deterministic secondary key `(variant, id)`, characters first.
//!
//! # Implementations
//!
//! - [`postgres::PostgresVectorStore`] — pgvector-backed, pooled.
//! - [`memory::MemoryVectorStore`] — in-process, for tests and demos.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::types::{Entity, SearchResult};

pub use memory::MemoryVectorStore;
pub use postgres::PostgresVectorStore;

/// Unified interface over vector datastore implementations.
#[async_trait]
pub trait VectorBackend: Send + Sync {
    /// Insert or replace `entity` with its embedding.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Dimension`] if the vector length differs from
    /// the store's fixed dimension, or [`CoreError::Storage`] on datastore
    /// failure.
    async fn upsert(&self, entity: &Entity, vector: &[f32]) -> Result<(), CoreError>;

    /// The `limit` entities nearest to `vector` by cosine distance, both
    /// variants merged, ascending by distance.
    async fn rank_by_distance(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>, CoreError>;

    /// Total number of stored entities.
    async fn count(&self) -> Result<usize, CoreError>;
}

/// Reject vectors that violate a store's fixed-dimension contract.
pub fn ensure_dimension(vector: &[f32], want: usize) -> Result<(), CoreError> {
    if vector.len() == want {
        Ok(())
    } else {
        Err(CoreError::Dimension {
            got: vector.len(),
            want,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_dimension_accepted() {
        assert!(ensure_dimension(&[0.0; 4], 4).is_ok());
    }

    #[test]
    fn short_and_long_vectors_rejected() {
        assert!(matches!(
            ensure_dimension(&[0.0; 3], 4),
            Err(CoreError::Dimension { got: 3, want: 4 })
        ));
        assert!(matches!(
            ensure_dimension(&[0.0; 5], 4),
            Err(CoreError::Dimension { got: 5, want: 4 })
        ));
    }
}
