//! Domain types shared by the processor, the stores and the retrieval engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub type ChunkId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl ComplexityLevel {
    pub const ALL: [ComplexityLevel; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum EvidenceLevel {
    ResearchBased,
    Practical,
    Anecdotal,
}

impl EvidenceLevel {
    pub const ALL: [EvidenceLevel; 3] = [Self::ResearchBased, Self::Practical, Self::Anecdotal];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ResearchBased => "research-based",
            Self::Practical => "practical",
            Self::Anecdotal => "anecdotal",
        }
    }
}

impl fmt::Display for EvidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChunkType {
    #[default]
    Content,
    Header,
    Summary,
    Example,
}

/// Caller-supplied metadata for a whole document.
///
/// `title` and `category` are mandatory; everything else is optional and is
/// filled in per chunk by inference when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DocumentMetadata {
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub methodology: Option<String>,
    #[serde(default)]
    pub life_area: Option<String>,
    #[serde(default)]
    pub complexity_level: Option<ComplexityLevel>,
    #[serde(default)]
    pub evidence_level: Option<EvidenceLevel>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl DocumentMetadata {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self { title: title.into(), category: category.into(), ..Self::default() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    pub source_document_id: String,
    pub title: String,
    pub category: String,
    pub author: Option<String>,
    pub methodology: Option<String>,
    pub life_area: Option<String>,
    pub complexity_level: Option<ComplexityLevel>,
    pub evidence_level: Option<EvidenceLevel>,
    pub tags: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub chunk_type: ChunkType,
}

impl ChunkMetadata {
    /// Number of populated core fields out of
    /// title, category, author, methodology, life area, complexity.
    pub fn core_fields_populated(&self) -> usize {
        [
            !self.title.trim().is_empty(),
            !self.category.trim().is_empty(),
            self.author.is_some(),
            self.methodology.is_some(),
            self.life_area.is_some(),
            self.complexity_level.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

/// An independently retrievable slice of a source document.
///
/// Immutable once produced by the document processor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub id: ChunkId,
    pub content: String,
    pub index: usize,
    pub metadata: ChunkMetadata,
    pub quality_score: f32,
    pub word_count: usize,
    pub char_count: usize,
    pub embedding_ready: bool,
}

impl Chunk {
    pub fn make_id(document_id: &str, index: usize) -> ChunkId {
        format!("{document_id}_chunk_{index}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipType {
    Prerequisite,
    Continuation,
    Example,
    Reference,
}

/// Directed edge between two chunks of the same document. Index entry only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkRelationship {
    pub source_chunk_id: ChunkId,
    pub related_chunk_id: ChunkId,
    pub relationship_type: RelationshipType,
    pub strength: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityReport {
    pub overall_score: f32,
    pub content_score: f32,
    pub structure_score: f32,
    pub metadata_score: f32,
    pub embedding_score: f32,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Denormalized parent document attached to every search hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentRef {
    pub id: String,
    pub title: String,
    pub category: String,
    pub author: Option<String>,
}

/// Audit trail left by a domain adapter when it re-scores a result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreTrail {
    pub original_score: f32,
    pub boosted_score: f32,
    pub personalization_score: f32,
    pub filter_reasons: Vec<String>,
}

/// A retrieval hit.
///
/// `similarity` is never negative but is not clamped to 1: adapter boosts may
/// push it higher before the final truncation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub id: ChunkId,
    pub content: String,
    pub similarity: f32,
    pub metadata: ChunkMetadata,
    pub document: DocumentRef,
    pub chunk_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring: Option<ScoreTrail>,
}

/// Row shape returned by both store query modes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreRow {
    pub id: ChunkId,
    pub document_id: String,
    pub chunk_content: String,
    pub similarity: f32,
    pub metadata: ChunkMetadata,
    pub document_title: String,
    pub document_category: String,
    pub document_author: Option<String>,
    pub chunk_index: usize,
}

impl From<StoreRow> for SearchResult {
    fn from(row: StoreRow) -> Self {
        Self {
            id: row.id,
            content: row.chunk_content,
            similarity: row.similarity.max(0.0),
            metadata: row.metadata,
            document: DocumentRef {
                id: row.document_id,
                title: row.document_title,
                category: row.document_category,
                author: row.document_author,
            },
            chunk_index: row.chunk_index,
            scoring: None,
        }
    }
}

/// Per-request enhancement hints. Adapters read only the fields they use.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DomainContext {
    #[serde(default)]
    pub preferred_methodology: Option<String>,
    #[serde(default)]
    pub life_area: Option<String>,
    #[serde(default)]
    pub complexity_level: Option<ComplexityLevel>,
    #[serde(default)]
    pub user_goals: Vec<String>,
    #[serde(default)]
    pub search_history: Vec<String>,
    #[serde(default)]
    pub career_stage: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}
