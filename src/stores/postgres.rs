//! pgvector-backed entity store.
//!
//! ## Database schema
//!
//! The store expects the following table (migration orchestration is the
//! deployment's concern, matching how the checkpoint schema is handled
//! elsewhere in this stack):
//!
//! ```sql
//! CREATE EXTENSION IF NOT EXISTS vector;
//! CREATE TABLE entities (
//!     id        BIGINT NOT NULL,
//!     variant   TEXT   NOT NULL CHECK (variant IN ('character', 'location')),
//!     name      TEXT   NOT NULL,
//!     attrs     JSONB  NOT NULL,
//!     embedding vector(768) NOT NULL,
//!     PRIMARY KEY (id, variant)
//! );
//! ```
//!
//! `attrs` holds the serde-tagged [`EntityAttrs`](crate::types::EntityAttrs)
//! payload, so one merged query reconstructs either variant.
//!
//! ## Connection discipline
//!
//! Every operation checks a connection out of the pool with scoped
//! acquisition; the checkout is released when the guard drops, on success
//! and on every error path alike.

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::instrument;

use super::{VectorBackend, ensure_dimension};
use crate::error::CoreError;
use crate::types::{EMBEDDING_DIM, Entity, EntityAttrs, SearchResult};

/// Entity store over a pooled Postgres connection with pgvector.
#[derive(Clone)]
pub struct PostgresVectorStore {
    pool: PgPool,
    dim: usize,
}

impl PostgresVectorStore {
    /// Wrap an existing pool. The schema above must already exist.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            dim: EMBEDDING_DIM,
        }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Render a vector as the pgvector text literal `[x,y,...]`.
fn vector_literal(vector: &[f32]) -> String {
    let mut out = String::with_capacity(vector.len() * 10 + 2);
    out.push('[');
    for (i, v) in vector.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&v.to_string());
    }
    out.push(']');
    out
}

fn decode_result_row(row: &PgRow) -> Result<SearchResult, CoreError> {
    let id: i64 = row.try_get("id")?;
    let name: String = row.try_get("name")?;
    let attrs_json: serde_json::Value = row.try_get("attrs")?;
    let distance: f64 = row.try_get("distance")?;

    let attrs: EntityAttrs = serde_json::from_value(attrs_json)
        .map_err(|err| CoreError::Storage(format!("undecodable attrs payload: {err}")))?;

    Ok(SearchResult {
        entity: Entity { id, name, attrs },
        distance,
    })
}

#[async_trait]
impl VectorBackend for PostgresVectorStore {
    #[instrument(skip_all, fields(id = entity.id, variant = %entity.variant()))]
    async fn upsert(&self, entity: &Entity, vector: &[f32]) -> Result<(), CoreError> {
        ensure_dimension(vector, self.dim)?;

        let attrs = serde_json::to_value(&entity.attrs)
            .map_err(|err| CoreError::Storage(err.to_string()))?;

        let mut conn = self.pool.acquire().await?;
        sqlx::query(
            "INSERT INTO entities (id, variant, name, attrs, embedding) \
             VALUES ($1, $2, $3, $4, $5::vector) \
             ON CONFLICT (id, variant) DO UPDATE \
             SET name = EXCLUDED.name, attrs = EXCLUDED.attrs, \
                 embedding = EXCLUDED.embedding",
        )
        .bind(entity.id)
        .bind(entity.variant().to_string())
        .bind(&entity.name)
        .bind(attrs)
        .bind(vector_literal(vector))
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    #[instrument(skip_all, fields(limit = limit))]
    async fn rank_by_distance(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>, CoreError> {
        ensure_dimension(vector, self.dim)?;

        let mut conn = self.pool.acquire().await?;
        // `<=>` is pgvector cosine distance. Secondary ordering keys make
        // equal-distance merges deterministic: 'character' sorts before
        // 'location', then ascending id.
        let rows = sqlx::query(
            "SELECT id, variant, name, attrs, \
                    (embedding <=> $1::vector)::float8 AS distance \
             FROM entities \
             ORDER BY distance ASC, variant ASC, id ASC \
             LIMIT $2",
        )
        .bind(vector_literal(vector))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(decode_result_row).collect()
    }

    async fn count(&self) -> Result<usize, CoreError> {
        let mut conn = self.pool.acquire().await?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entities")
            .fetch_one(&mut *conn)
            .await?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_literal_format() {
        assert_eq!(vector_literal(&[1.0, -0.5, 0.25]), "[1,-0.5,0.25]");
        assert_eq!(vector_literal(&[]), "[]");
    }
}
