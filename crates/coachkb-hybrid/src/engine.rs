//! Semantic and hybrid search over a [`KnowledgeStore`].

use std::sync::Arc;
use tracing::{debug, warn};

use coachkb_core::config::RetrievalConfig;
use coachkb_core::traits::{KnowledgeStore, StoreFilter};
use coachkb_core::types::SearchResult;
use coachkb_core::{Error, Result};
use coachkb_embed::EmbeddingService;

use crate::fusion::{fuse, FusionWeights};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub limit: usize,
    /// Minimum cosine similarity for the semantic branch.
    pub threshold: f32,
    pub category: Option<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::from_config(&RetrievalConfig::default())
    }
}

impl SearchOptions {
    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self { limit: config.default_limit, threshold: config.default_threshold, category: None }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    fn filter(&self, domain: &str) -> StoreFilter {
        StoreFilter::for_domain(domain).with_category(self.category.clone())
    }
}

/// Semantic, lexical and fused retrieval over a [`KnowledgeStore`].
pub struct HybridSearchEngine {
    embeddings: EmbeddingService,
    store: Arc<dyn KnowledgeStore>,
    config: RetrievalConfig,
}

impl HybridSearchEngine {
    pub fn new(embeddings: EmbeddingService, store: Arc<dyn KnowledgeStore>, config: RetrievalConfig) -> Self {
        Self { embeddings, store, config }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn default_options(&self) -> SearchOptions {
        SearchOptions::from_config(&self.config)
    }

    /// Embed `query` and return its nearest neighbours in `domain`.
    /// Provider and store failures propagate.
    pub async fn semantic_search(&self, domain: &str, query: &str, opts: &SearchOptions) -> Result<Vec<SearchResult>> {
        validate_query(query)?;
        if opts.limit == 0 {
            return Ok(Vec::new());
        }
        let embedding = self.embeddings.embed(query).await?;
        let rows = self
            .store
            .nearest_neighbors(&embedding, opts.threshold, opts.limit, &opts.filter(domain))
            .await
            .map_err(|e| Error::Search(format!("nearest neighbours: {e:#}")))?;
        debug!(domain, hits = rows.len(), "semantic search");
        Ok(rows.into_iter().map(SearchResult::from).collect())
    }

    /// Semantic and lexical search fused with RRF. Degrades to
    /// [`Self::semantic_search`] when hybrid mode is off or either branch fails.
    pub async fn hybrid_search(&self, domain: &str, query: &str, opts: &SearchOptions) -> Result<Vec<SearchResult>> {
        validate_query(query)?;
        if !self.config.hybrid_enabled {
            return self.semantic_search(domain, query, opts).await;
        }
        if opts.limit == 0 {
            return Ok(Vec::new());
        }

        let relaxed = SearchOptions {
            limit: opts.limit.saturating_mul(self.config.candidate_multiplier.max(1)),
            threshold: opts.threshold * self.config.threshold_relaxation,
            category: opts.category.clone(),
        };
        let (semantic, text) =
            tokio::join!(self.semantic_search(domain, query, &relaxed), self.text_search(domain, query, opts));

        match (semantic, text) {
            (Ok(semantic), Ok(text)) => {
                let (semantic_hits, text_hits) = (semantic.len(), text.len());
                let fused = fuse(semantic, text, &FusionWeights::from(&self.config), opts.limit);
                debug!(domain, semantic_hits, text_hits, fused = fused.len(), "hybrid search");
                Ok(fused)
            }
            (semantic, text) => {
                warn!(
                    domain,
                    semantic_error = ?semantic.err(),
                    text_error = ?text.err(),
                    "hybrid search degraded to semantic only"
                );
                self.semantic_search(domain, query, opts).await
            }
        }
    }

    async fn text_search(&self, domain: &str, query: &str, opts: &SearchOptions) -> Result<Vec<SearchResult>> {
        let rows = self
            .store
            .lexical_match(query, opts.limit, &opts.filter(domain))
            .await
            .map_err(|e| Error::Search(format!("lexical match: {e:#}")))?;
        Ok(rows.into_iter().map(SearchResult::from).collect())
    }
}

fn validate_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(Error::Validation("query is empty".to_string()));
    }
    Ok(())
}
