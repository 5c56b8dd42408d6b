//! In-process vector store for tests and offline demos.
//!
//! Implements the same cosine-distance semantics and tie-break ordering as
//! the Postgres backend, without a database.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{VectorBackend, ensure_dimension};
use crate::error::CoreError;
use crate::types::{EMBEDDING_DIM, Entity, SearchResult};

/// Entity store holding everything in memory behind an async lock.
#[derive(Debug)]
pub struct MemoryVectorStore {
    entries: RwLock<Vec<(Entity, Vec<f32>)>>,
    dim: usize,
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryVectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            dim: EMBEDDING_DIM,
        }
    }

    /// Store accepting a non-standard dimension (test-only scenarios).
    #[must_use]
    pub fn with_dim(dim: usize) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            dim,
        }
    }
}

/// Cosine distance: `1 - cos(a, b)`, in `[0, 2]`.
///
/// A zero-magnitude operand yields the maximally dissimilar distance 2.0
/// rather than NaN, keeping result ordering total.
#[must_use]
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 2.0;
    }
    1.0 - dot / denom
}

#[async_trait]
impl VectorBackend for MemoryVectorStore {
    async fn upsert(&self, entity: &Entity, vector: &[f32]) -> Result<(), CoreError> {
        ensure_dimension(vector, self.dim)?;
        let mut entries = self.entries.write().await;
        let key = (entity.id, entity.variant());
        if let Some(slot) = entries
            .iter_mut()
            .find(|(e, _)| (e.id, e.variant()) == key)
        {
            *slot = (entity.clone(), vector.to_vec());
        } else {
            entries.push((entity.clone(), vector.to_vec()));
        }
        Ok(())
    }

    async fn rank_by_distance(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>, CoreError> {
        ensure_dimension(vector, self.dim)?;
        let entries = self.entries.read().await;
        let mut results: Vec<SearchResult> = entries
            .iter()
            .map(|(entity, stored)| SearchResult {
                entity: entity.clone(),
                distance: cosine_distance(stored, vector),
            })
            .collect();
        results.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.entity.variant().cmp(&b.entity.variant()))
                .then_with(|| a.entity.id.cmp(&b.entity.id))
        });
        results.truncate(limit);
        Ok(results)
    }

    async fn count(&self) -> Result<usize, CoreError> {
        Ok(self.entries.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CharacterAttrs, EntityAttrs, EntityVariant, LocationAttrs};

    fn character(id: i64, name: &str) -> Entity {
        Entity {
            id,
            name: name.into(),
            attrs: EntityAttrs::Character(CharacterAttrs::default()),
        }
    }

    fn location(id: i64, name: &str) -> Entity {
        Entity {
            id,
            name: name.into(),
            attrs: EntityAttrs::Location(LocationAttrs::default()),
        }
    }

    fn axis(dim: usize, index: usize) -> Vec<f32> {
        let mut v = vec![0.0; dim];
        v[index] = 1.0;
        v
    }

    #[test]
    fn cosine_distance_basics() {
        assert!((cosine_distance(&[1.0, 0.0], &[1.0, 0.0])).abs() < 1e-9);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-9);
        assert!((cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 1e-9);
        assert!((cosine_distance(&[0.0, 0.0], &[1.0, 0.0]) - 2.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn upsert_replaces_by_composite_identity() {
        let store = MemoryVectorStore::with_dim(4);
        store.upsert(&character(1, "old"), &axis(4, 0)).await.unwrap();
        store.upsert(&character(1, "new"), &axis(4, 1)).await.unwrap();
        store.upsert(&location(1, "loc"), &axis(4, 2)).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn ranking_ascending_and_limited() {
        let store = MemoryVectorStore::with_dim(4);
        store.upsert(&character(1, "near"), &axis(4, 0)).await.unwrap();
        store
            .upsert(&character(2, "far"), &axis(4, 1))
            .await
            .unwrap();
        store
            .upsert(&location(3, "mid"), &[0.7, 0.7, 0.0, 0.0])
            .await
            .unwrap();

        let results = store.rank_by_distance(&axis(4, 0), 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].entity.name, "near");
        assert_eq!(results[1].entity.name, "mid");
        assert!(results[0].distance <= results[1].distance);
    }

    #[tokio::test]
    async fn equal_distance_breaks_on_variant_then_id() {
        let store = MemoryVectorStore::with_dim(4);
        let v = axis(4, 0);
        store.upsert(&location(1, "l1"), &v).await.unwrap();
        store.upsert(&character(2, "c2"), &v).await.unwrap();
        store.upsert(&character(1, "c1"), &v).await.unwrap();

        let results = store.rank_by_distance(&v, 3).await.unwrap();
        let order: Vec<(EntityVariant, i64)> = results
            .iter()
            .map(|r| (r.entity.variant(), r.entity.id))
            .collect();
        assert_eq!(
            order,
            vec![
                (EntityVariant::Character, 1),
                (EntityVariant::Character, 2),
                (EntityVariant::Location, 1),
            ]
        );
    }

    #[tokio::test]
    async fn wrong_dimension_rejected() {
        let store = MemoryVectorStore::with_dim(4);
        let err = store
            .upsert(&character(1, "x"), &[1.0, 0.0])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Dimension { got: 2, want: 4 }));
    }
}
