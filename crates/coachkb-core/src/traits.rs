//! Seams to the embedding model and the knowledge store.

use async_trait::async_trait;

use crate::types::{Chunk, StoreRow};

/// Text → fixed-length vector. Implementations own their own timeouts.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `hash:xxh64:d384`).
    fn model_id(&self) -> &str;
    fn dimension(&self) -> usize;
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
}

/// Domain and category scoping applied by both query modes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreFilter {
    pub domain: Option<String>,
    pub category: Option<String>,
}

impl StoreFilter {
    pub fn for_domain(domain: &str) -> Self {
        Self { domain: Some(domain.to_string()), category: None }
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn matches(&self, domain: &str, category: &str) -> bool {
        self.domain.as_deref().map_or(true, |d| d == domain)
            && self.category.as_deref().map_or(true, |c| c == category)
    }
}

/// Persistence and query surface for chunks and their vectors.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Rows whose cosine similarity to `embedding` is at least `threshold`,
    /// best first.
    async fn nearest_neighbors(
        &self,
        embedding: &[f32],
        threshold: f32,
        limit: usize,
        filter: &StoreFilter,
    ) -> anyhow::Result<Vec<StoreRow>>;

    /// Ranked full-text matches, best first.
    async fn lexical_match(
        &self,
        query: &str,
        limit: usize,
        filter: &StoreFilter,
    ) -> anyhow::Result<Vec<StoreRow>>;

    async fn persist_chunk(
        &self,
        domain: &str,
        chunk: &Chunk,
        embedding: Option<&[f32]>,
    ) -> anyhow::Result<()>;

    /// Removes every chunk (and vector) of a document. Returns the count removed.
    async fn delete_document(&self, domain: &str, document_id: &str) -> anyhow::Result<usize>;

    /// Bulk deletion of a domain's knowledge. Returns the count removed.
    async fn delete_domain(&self, domain: &str) -> anyhow::Result<usize>;
}
