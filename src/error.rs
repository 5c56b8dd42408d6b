//! Error taxonomy for the search and extraction core.
//!
//! Three failure families cross the module boundary:
//!
//! - [`CoreError::Upstream`] — a generation, embedding, or datastore call was
//!   unreachable or rejected the request.
//! - [`CoreError::EmbeddingShape`] — an embedding response arrived but no
//!   numeric vector could be located inside it. Fatal; never retried.
//! - [`CoreError::MissingInput`] — the caller omitted a required identifier
//!   or parameter. Validated at the boundary, not deep inside the pipeline.
//!
//! The structured extractor raises none of these for its three document
//! kinds; degraded output via the cascade is always preferred over failure.

use thiserror::Error;

/// The upstream capability a failed call was addressed to.
///
/// Carried inside [`CoreError::Upstream`] so callers can map failures to
/// responses without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Text generation (chat/completion style).
    Generation,
    /// Text embedding.
    Embedding,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generation => write!(f, "generation"),
            Self::Embedding => write!(f, "embedding"),
        }
    }
}

/// Errors produced by the search pipeline, providers, and stores.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An upstream model call was unreachable or rejected.
    #[error("{capability} call failed: {message}")]
    Upstream {
        capability: Capability,
        message: String,
    },

    /// The embedding response contained no locatable numeric array.
    #[error("embedding response contained no numeric vector: {0}")]
    EmbeddingShape(String),

    /// A required caller-supplied input was absent.
    #[error("missing required input: {what}")]
    MissingInput { what: &'static str },

    /// A vector violated the datastore's fixed-dimension contract.
    #[error("vector has {got} dimensions, store requires exactly {want}")]
    Dimension { got: usize, want: usize },

    /// Datastore connection or query failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl CoreError {
    /// Shorthand for a generation-capability upstream failure.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Upstream {
            capability: Capability::Generation,
            message: message.into(),
        }
    }

    /// Shorthand for an embedding-capability upstream failure.
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Upstream {
            capability: Capability::Embedding,
            message: message.into(),
        }
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        CoreError::Storage(err.to_string())
    }
}
