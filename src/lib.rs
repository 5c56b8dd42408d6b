//! # Loreweave: semantic search and structured extraction for entity lore
//!
//! Loreweave answers natural-language queries about knowledge-graph
//! entities (characters and locations) by combining generative-model text
//! with vector-embedding retrieval, and turns free-form model output into
//! schema-conformant records.
//!
//! ## The two engines
//!
//! **Semantic search** (`search`, `stores`): terse queries are expanded by
//! a generation call, embedded into a fixed 768-dimension vector, and
//! ranked against both entity variants in one merged cosine-distance
//! ordering.
//!
//! ```rust,no_run
//! use loreweave::config::PipelineConfig;
//! use loreweave::providers::GeminiProvider;
//! use loreweave::search::SearchPipeline;
//! use loreweave::stores::MemoryVectorStore;
//!
//! # async fn example() -> Result<(), loreweave::error::CoreError> {
//! let config = PipelineConfig::builder().with_env().build().expect("config");
//! let provider = GeminiProvider::new("api-key", &config.embedding_model);
//! let store = MemoryVectorStore::new();
//!
//! let pipeline = SearchPipeline::new(&provider, &provider, &store, &config);
//! let hits = pipeline.search("alien").await?;
//! for hit in hits {
//!     println!("{} ({:.3})", hit.entity.name, hit.distance);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! **Structured extraction** (`extract`): a five-tier parse cascade turns
//! whatever a model produced — clean JSON, fenced JSON, JSON buried in
//! prose, headed sections, or formless text — into a fully populated record
//! of the requested kind. The terminal tier cannot decline, so extraction
//! never fails:
//!
//! ```rust
//! use loreweave::extract::extract_structured;
//! use loreweave::types::{DocumentKind, ExtractionResult};
//!
//! let result = extract_structured(
//!     DocumentKind::Compatibility,
//!     r#"{"teamWork":["improvise well"],"conflicts":[],"breaksFirst":["the sidekick"]}"#,
//! );
//! assert!(matches!(result, ExtractionResult::Compatibility(_)));
//! ```
//!
//! ## Module guide
//!
//! - [`types`] — entities, search results, document records
//! - [`config`] — immutable pipeline configuration and prompt templates
//! - [`providers`] — generation/embedding capabilities (HTTP and mock)
//! - [`stores`] — vector datastore backends (Postgres/pgvector, memory)
//! - [`search`] — the enhance → embed → rank pipeline
//! - [`extract`] — the structured-output cascade and normalizers
//! - [`flows`] — multi-entity orchestration with fallback policy
//! - [`error`] — the crate error taxonomy
//! - [`telemetry`] — tracing bootstrap for binaries

pub mod config;
pub mod error;
pub mod extract;
pub mod flows;
pub mod providers;
pub mod search;
pub mod stores;
pub mod telemetry;
pub mod types;

pub use error::{Capability, CoreError};
pub use types::{DocumentKind, Entity, EntityVariant, ExtractionResult, SearchResult};
