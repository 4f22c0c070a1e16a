//! Ingestion into a [`KnowledgeStore`]: process, embed, persist.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use coachkb_core::config::IngestConfig;
use coachkb_core::traits::KnowledgeStore;
use coachkb_core::{CapturedError, Error, Result, Stage};
use coachkb_embed::EmbeddingService;

use crate::processor::{DocumentInput, DocumentProcessor};

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub document_id: String,
    pub domain: String,
    pub chunks_total: usize,
    pub chunks_embedded: usize,
    pub chunks_persisted: usize,
    pub relationships: usize,
    pub quality_score: f32,
    pub attempts: usize,
    pub errors: Vec<CapturedError>,
}

#[derive(Debug)]
pub struct IngestFailure {
    pub document_id: String,
    pub attempts: usize,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct IngestOutcome {
    /// Successful reports, in input order.
    pub reports: Vec<IngestReport>,
    pub failures: Vec<IngestFailure>,
}

pub struct KnowledgeIngestor {
    processor: DocumentProcessor,
    embeddings: EmbeddingService,
    store: Arc<dyn KnowledgeStore>,
    config: IngestConfig,
}

impl KnowledgeIngestor {
    pub fn new(
        processor: DocumentProcessor,
        embeddings: EmbeddingService,
        store: Arc<dyn KnowledgeStore>,
        config: IngestConfig,
    ) -> Self {
        Self { processor, embeddings, store, config }
    }

    /// Process one document and persist its chunks under `domain`.
    ///
    /// Chunks that are not embedding-ready, or whose embedding fails, are
    /// still persisted for lexical retrieval. Fails only on invalid input or
    /// when the store accepts none of the chunks.
    pub async fn ingest_document(&self, domain: &str, input: &DocumentInput) -> Result<IngestReport> {
        if domain.trim().is_empty() {
            return Err(Error::Validation("domain is empty".to_string()));
        }
        let processor = self.processor.clone();
        let owned = input.clone();
        let processed = tokio::task::spawn_blocking(move || {
            processor.process(&owned.document_id, &owned.content, &owned.metadata, owned.options.as_ref())
        })
        .await
        .map_err(|e| Error::Processing(format!("processing task failed: {e}")))??;

        let mut errors = processed.errors;
        let ready: Vec<usize> = processed
            .chunks
            .iter()
            .enumerate()
            .filter(|(_, c)| c.embedding_ready)
            .map(|(i, _)| i)
            .collect();
        let texts: Vec<String> = ready.iter().map(|&i| processed.chunks[i].content.clone()).collect();
        let mut vectors: Vec<Option<Vec<f32>>> = vec![None; processed.chunks.len()];
        for (&i, result) in ready.iter().zip(self.embeddings.embed_batch(&texts).await) {
            match result {
                Ok(vector) => vectors[i] = Some(vector),
                Err(e) => errors.push(CapturedError::error(Stage::Embedding, e.to_string()).for_chunk(&processed.chunks[i].id)),
            }
        }
        let chunks_embedded = vectors.iter().filter(|v| v.is_some()).count();

        let mut chunks_persisted = 0;
        for (chunk, vector) in processed.chunks.iter().zip(&vectors) {
            match self.store.persist_chunk(domain, chunk, vector.as_deref()).await {
                Ok(()) => chunks_persisted += 1,
                Err(e) => errors.push(CapturedError::error(Stage::Persistence, format!("{e:#}")).for_chunk(&chunk.id)),
            }
        }
        if chunks_persisted == 0 && !processed.chunks.is_empty() {
            return Err(Error::Processing(format!(
                "store rejected all {} chunks of '{}'",
                processed.chunks.len(),
                processed.document_id
            )));
        }

        info!(
            document = %processed.document_id,
            domain,
            persisted = chunks_persisted,
            embedded = chunks_embedded,
            "document ingested"
        );
        Ok(IngestReport {
            document_id: processed.document_id,
            domain: domain.to_string(),
            chunks_total: processed.chunks.len(),
            chunks_embedded,
            chunks_persisted,
            relationships: processed.relationships.len(),
            quality_score: processed.quality_report.overall_score,
            attempts: 1,
            errors,
        })
    }

    /// Ingest many documents with at most `max_concurrency` in flight.
    /// Retryable failures are attempted up to `max_attempts` times with a
    /// linear backoff.
    pub async fn ingest_many(&self, domain: &str, inputs: Vec<DocumentInput>) -> IngestOutcome {
        let concurrency = self.config.max_concurrency.max(1);
        let mut results: Vec<(usize, std::result::Result<IngestReport, IngestFailure>)> = stream::iter(inputs.iter().enumerate())
            .map(|(position, input)| async move { (position, self.ingest_with_retry(domain, input).await) })
            .buffer_unordered(concurrency)
            .collect()
            .await;
        results.sort_by_key(|(position, _)| *position);

        let mut outcome = IngestOutcome::default();
        for (_, result) in results {
            match result {
                Ok(report) => outcome.reports.push(report),
                Err(failure) => outcome.failures.push(failure),
            }
        }
        info!(domain, ingested = outcome.reports.len(), failed = outcome.failures.len(), "ingestion finished");
        outcome
    }

    async fn ingest_with_retry(
        &self,
        domain: &str,
        input: &DocumentInput,
    ) -> std::result::Result<IngestReport, IngestFailure> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.ingest_document(domain, input).await {
                Ok(mut report) => {
                    report.attempts = attempt;
                    return Ok(report);
                }
                Err(error) if error.is_retryable() && attempt < max_attempts => {
                    warn!(document = %input.document_id, attempt, %error, "ingestion failed, retrying");
                    tokio::time::sleep(Duration::from_millis(self.config.retry_backoff_ms * attempt as u64)).await;
                    attempt += 1;
                }
                Err(error) => {
                    warn!(document = %input.document_id, attempt, %error, "ingestion failed");
                    return Err(IngestFailure { document_id: input.document_id.clone(), attempts: attempt, error });
                }
            }
        }
    }

    pub async fn delete_document(&self, domain: &str, document_id: &str) -> Result<usize> {
        let removed = self
            .store
            .delete_document(domain, document_id)
            .await
            .map_err(|e| Error::Processing(format!("{e:#}")))?;
        info!(domain, document = document_id, removed, "document deleted");
        Ok(removed)
    }

    /// Remove every chunk stored under `domain`.
    pub async fn delete_domain_knowledge(&self, domain: &str) -> Result<usize> {
        let removed = self.store.delete_domain(domain).await.map_err(|e| Error::Processing(format!("{e:#}")))?;
        info!(domain, removed, "domain knowledge deleted");
        Ok(removed)
    }
}
