//! Domain-aware retrieval: enhance, search, re-rank.

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use coachkb_core::types::{DomainContext, SearchResult};
use coachkb_core::Result;
use coachkb_domain::{AdapterRegistry, EnhancedQuery};

use crate::engine::{HybridSearchEngine, SearchOptions};

#[derive(Debug, Clone, Serialize)]
pub struct DomainSearchResponse {
    pub domain: String,
    pub query: EnhancedQuery,
    pub results: Vec<SearchResult>,
}

/// Domain-aware retrieval: enhance the query, run hybrid search, then let
/// the domain's adapter re-score and filter.
pub struct DomainRetrievalService {
    engine: HybridSearchEngine,
    registry: Arc<AdapterRegistry>,
}

impl DomainRetrievalService {
    pub fn new(engine: HybridSearchEngine, registry: Arc<AdapterRegistry>) -> Self {
        Self { engine, registry }
    }

    pub fn engine(&self) -> &HybridSearchEngine {
        &self.engine
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub async fn search(
        &self,
        domain: &str,
        query: &str,
        context: &DomainContext,
        opts: &SearchOptions,
    ) -> Result<DomainSearchResponse> {
        let adapter = self.registry.get_adapter(domain);
        let enhanced = adapter.enhance_query(query, context);
        let candidates = self.engine.hybrid_search(domain, &enhanced.enhanced_query, opts).await?;
        let candidate_count = candidates.len();
        let mut results = adapter.filter_results(candidates, context);
        results.truncate(opts.limit);
        info!(
            domain,
            adapter = adapter.domain_id(),
            confidence = enhanced.confidence,
            candidates = candidate_count,
            results = results.len(),
            "domain search"
        );
        Ok(DomainSearchResponse { domain: domain.to_string(), query: enhanced, results })
    }
}
