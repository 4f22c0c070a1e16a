//! In-process [`KnowledgeStore`] backed by a chunk map and a lexical index.

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::debug;

use coachkb_core::traits::{KnowledgeStore, StoreFilter};
use coachkb_core::types::{Chunk, StoreRow};

use crate::lexical::LexicalIndex;
use crate::tantivy_utils::compose_key;

struct StoredChunk {
    domain: String,
    chunk: Chunk,
    embedding: Option<Vec<f32>>,
}

impl StoredChunk {
    fn to_row(&self, similarity: f32) -> StoreRow {
        let meta = &self.chunk.metadata;
        StoreRow {
            id: self.chunk.id.clone(),
            document_id: meta.source_document_id.clone(),
            chunk_content: self.chunk.content.clone(),
            similarity,
            metadata: meta.clone(),
            document_title: meta.title.clone(),
            document_category: meta.category.clone(),
            document_author: meta.author.clone(),
            chunk_index: self.chunk.index,
        }
    }
}

/// Domain-scoped in-process store: brute-force cosine over stored vectors
/// plus a tantivy RAM index for lexical matches.
///
/// Lexical similarities are BM25 scores divided by the best score of the
/// query, so the top lexical hit always reports 1.0.
pub struct MemoryStore {
    chunks: RwLock<BTreeMap<String, StoredChunk>>,
    lexical: LexicalIndex,
}

impl MemoryStore {
    pub fn new() -> Result<Self> {
        Ok(Self { chunks: RwLock::new(BTreeMap::new()), lexical: LexicalIndex::in_memory()? })
    }

    pub fn len(&self) -> usize {
        self.chunks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.read().is_empty()
    }

    pub fn count_in_domain(&self, domain: &str) -> usize {
        self.chunks.read().values().filter(|s| s.domain == domain).count()
    }

    pub fn has_embedding(&self, domain: &str, chunk_id: &str) -> bool {
        self.chunks
            .read()
            .get(&compose_key(domain, chunk_id))
            .is_some_and(|s| s.embedding.is_some())
    }

    fn remove_where(&self, predicate: impl Fn(&StoredChunk) -> bool) -> usize {
        let mut chunks = self.chunks.write();
        let before = chunks.len();
        chunks.retain(|_, stored| !predicate(stored));
        before - chunks.len()
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na <= f32::EPSILON || nb <= f32::EPSILON {
        return 0.0;
    }
    dot / (na * nb)
}

#[async_trait]
impl KnowledgeStore for MemoryStore {
    async fn nearest_neighbors(
        &self,
        embedding: &[f32],
        threshold: f32,
        limit: usize,
        filter: &StoreFilter,
    ) -> Result<Vec<StoreRow>> {
        let chunks = self.chunks.read();
        let mut scored: Vec<(f32, &StoredChunk)> = chunks
            .values()
            .filter(|s| filter.matches(&s.domain, &s.chunk.metadata.category))
            .filter_map(|s| s.embedding.as_deref().map(|v| (cosine_similarity(embedding, v), s)))
            .filter(|(sim, _)| *sim >= threshold)
            .collect();
        // Stable sort over key order keeps ties deterministic.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(limit);
        debug!(hits = scored.len(), threshold, "nearest_neighbors");
        Ok(scored.into_iter().map(|(sim, s)| s.to_row(sim.max(0.0))).collect())
    }

    async fn lexical_match(&self, query: &str, limit: usize, filter: &StoreFilter) -> Result<Vec<StoreRow>> {
        let hits = self.lexical.search(query, limit, filter)?;
        let best = hits.first().map(|h| h.score).unwrap_or(0.0);
        let chunks = self.chunks.read();
        let rows = hits
            .into_iter()
            .filter_map(|hit| {
                let stored = chunks.get(&compose_key(&hit.domain, &hit.chunk_id))?;
                let similarity = if best > 0.0 { hit.score / best } else { 0.0 };
                Some(stored.to_row(similarity))
            })
            .collect::<Vec<_>>();
        debug!(hits = rows.len(), "lexical_match");
        Ok(rows)
    }

    async fn persist_chunk(&self, domain: &str, chunk: &Chunk, embedding: Option<&[f32]>) -> Result<()> {
        self.lexical.upsert(
            domain,
            &chunk.metadata.source_document_id,
            &chunk.id,
            &chunk.metadata.category,
            &chunk.content,
        )?;
        self.chunks.write().insert(
            compose_key(domain, &chunk.id),
            StoredChunk { domain: domain.to_string(), chunk: chunk.clone(), embedding: embedding.map(<[f32]>::to_vec) },
        );
        Ok(())
    }

    async fn delete_document(&self, domain: &str, document_id: &str) -> Result<usize> {
        self.lexical.delete_document(domain, document_id)?;
        Ok(self.remove_where(|s| s.domain == domain && s.chunk.metadata.source_document_id == document_id))
    }

    async fn delete_domain(&self, domain: &str) -> Result<usize> {
        self.lexical.delete_domain(domain)?;
        Ok(self.remove_where(|s| s.domain == domain))
    }
}
