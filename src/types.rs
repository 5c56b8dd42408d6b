//! Core data model: entities, search results, and structured-output records.
//!
//! Entities come in two mutually exclusive variants — characters and
//! locations — whose numeric ids are **not** globally unique across variants.
//! Identity is therefore the composite `(id, variant)` pair everywhere in
//! this crate.
//!
//! All values here are request-scoped; nothing in this module persists state
//! across calls.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed embedding dimensionality required by the vector datastore.
///
/// Any vector entering the store must have exactly this many elements.
pub const EMBEDDING_DIM: usize = 768;

// ── Entities ───────────────────────────────────────────────────────────

/// Which of the two entity record shapes a value carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityVariant {
    Character,
    Location,
}

impl std::fmt::Display for EntityVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Character => write!(f, "character"),
            Self::Location => write!(f, "location"),
        }
    }
}

/// Attributes specific to character entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterAttrs {
    pub status: String,
    pub species: String,
    /// Free-form subtype (e.g. "Parasite", "Clone"); often empty upstream.
    #[serde(default)]
    pub character_type: String,
    pub gender: String,
    #[serde(default)]
    pub image: String,
    /// Name of the character's last known location.
    #[serde(default)]
    pub location_name: String,
}

/// Attributes specific to location entities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationAttrs {
    pub location_type: String,
    pub dimension: String,
}

/// Variant-specific attribute payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum EntityAttrs {
    Character(CharacterAttrs),
    Location(LocationAttrs),
}

impl EntityAttrs {
    #[must_use]
    pub fn variant(&self) -> EntityVariant {
        match self {
            Self::Character(_) => EntityVariant::Character,
            Self::Location(_) => EntityVariant::Location,
        }
    }
}

/// An entity sourced from the external knowledge graph.
///
/// Identity is the composite `(id, variant)`; two entities with the same id
/// but different variants are distinct records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: i64,
    pub name: String,
    #[serde(flatten)]
    pub attrs: EntityAttrs,
}

impl Entity {
    #[must_use]
    pub fn variant(&self) -> EntityVariant {
        self.attrs.variant()
    }

    /// Render this entity's attributes as the text handed to the embedding
    /// capability. Deterministic so the same entity always embeds the same.
    #[must_use]
    pub fn profile_text(&self) -> String {
        match &self.attrs {
            EntityAttrs::Character(c) => {
                let mut text = format!(
                    "{} is a {} {} character ({}).",
                    self.name, c.status, c.species, c.gender
                );
                if !c.character_type.is_empty() {
                    text.push_str(&format!(" Type: {}.", c.character_type));
                }
                if !c.location_name.is_empty() {
                    text.push_str(&format!(" Last seen in {}.", c.location_name));
                }
                text
            }
            EntityAttrs::Location(l) => format!(
                "{} is a {} in dimension {}.",
                self.name, l.location_type, l.dimension
            ),
        }
    }
}

// ── Search results ─────────────────────────────────────────────────────

/// One ranked hit from the vector datastore.
///
/// `distance` is cosine distance (lower = more similar, conceptually in
/// `[0, 2]`). Result sets are always ordered ascending by distance; equal
/// distances break on `(variant, id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub entity: Entity,
    pub distance: f64,
}

// ── Structured-output documents ────────────────────────────────────────

/// The three structured-output schemas the extractor can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Compatibility,
    Evaluation,
    Insights,
}

impl DocumentKind {
    /// Number of labeled sections this kind expects from free text.
    #[must_use]
    pub fn section_count(self) -> usize {
        match self {
            Self::Compatibility => 3,
            Self::Evaluation => 3,
            Self::Insights => 1,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compatibility => write!(f, "compatibility"),
            Self::Evaluation => write!(f, "evaluation"),
            Self::Insights => write!(f, "insights"),
        }
    }
}

/// How two characters work together, clash, and which breaks first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityRecord {
    pub team_work: Vec<String>,
    pub conflicts: Vec<String>,
    pub breaks_first: Vec<String>,
}

/// Graded evaluation of a generated answer.
///
/// Every enumerated check key is always present once the record leaves the
/// core (see [`crate::extract::evaluation`]). `auto_score` is clamped to
/// `[0, 10]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRecord {
    pub checks: BTreeMap<String, bool>,
    pub quality_checks: BTreeMap<String, bool>,
    pub auto_score: f64,
    pub explanation: String,
}

/// Exactly five insight strings, extraction order preserved as a stable
/// prefix ahead of any synthesized padding.
pub type InsightList = Vec<String>;

/// Tagged result over the three document kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum ExtractionResult {
    Compatibility(CompatibilityRecord),
    Evaluation(EvaluationRecord),
    Insights(InsightList),
}

impl ExtractionResult {
    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Compatibility(_) => DocumentKind::Compatibility,
            Self::Evaluation(_) => DocumentKind::Evaluation,
            Self::Insights(_) => DocumentKind::Insights,
        }
    }
}
