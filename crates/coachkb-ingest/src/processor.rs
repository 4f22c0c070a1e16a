//! Document validation and the single and batch processing entry points.

use chrono::Utc;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use coachkb_core::config::ProcessingOptions;
use coachkb_core::types::{Chunk, ChunkRelationship, DocumentMetadata, QualityReport};
use coachkb_core::{CapturedError, Error, Result, Stage};

use crate::chunker::split_text;
use crate::metadata::{chunk_metadata, enrich};
use crate::preprocess::preprocess;
use crate::quality::{assess_chunk, document_report, is_embedding_ready};
use crate::relationships;

pub const MIN_CONTENT_CHARS: usize = 10;
pub const MAX_CONTENT_CHARS: usize = 1_000_000;

/// One document queued for batch processing or ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInput {
    pub document_id: String,
    pub content: String,
    pub metadata: DocumentMetadata,
    /// Overrides the processor's options for this document only.
    #[serde(default)]
    pub options: Option<ProcessingOptions>,
}

impl DocumentInput {
    pub fn new(document_id: impl Into<String>, content: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self { document_id: document_id.into(), content: content.into(), metadata, options: None }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    pub document_id: String,
    pub chunks: Vec<Chunk>,
    /// Base metadata enriched by inference over the whole text.
    pub metadata: DocumentMetadata,
    pub quality_report: QualityReport,
    pub relationships: Vec<ChunkRelationship>,
    pub errors: Vec<CapturedError>,
}

#[derive(Debug)]
pub struct DocumentFailure {
    pub document_id: String,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub processed: Vec<ProcessedDocument>,
    pub failures: Vec<DocumentFailure>,
}

/// Turns raw text into validated, scored and tagged chunks.
#[derive(Debug, Clone, Default)]
pub struct DocumentProcessor {
    options: ProcessingOptions,
}

impl DocumentProcessor {
    pub fn new(options: ProcessingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ProcessingOptions {
        &self.options
    }

    /// Process one document. Structurally invalid input fails before any
    /// chunking; chunk-level problems are reported in `errors`.
    pub fn process(
        &self,
        document_id: &str,
        content: &str,
        base: &DocumentMetadata,
        options: Option<&ProcessingOptions>,
    ) -> Result<ProcessedDocument> {
        let options = options.unwrap_or(&self.options);
        validate(document_id, content, base, options)?;

        let text = preprocess(content, options.preserve_structure);
        let split = split_text(&text, options);
        let mut errors: Vec<CapturedError> = split
            .discarded
            .iter()
            .map(|raw| {
                CapturedError::warning(
                    Stage::Chunking,
                    format!(
                        "discarded {}-char fragment at offset {} (minimum {})",
                        raw.content.chars().count(),
                        raw.start,
                        options.min_chunk_size
                    ),
                )
            })
            .collect();

        let created_at = base.created_at.unwrap_or_else(Utc::now);
        let mut chunks = Vec::with_capacity(split.chunks.len());
        let mut qualities = Vec::with_capacity(split.chunks.len());
        for (index, raw) in split.chunks.into_iter().enumerate() {
            let id = Chunk::make_id(document_id, index);
            let metadata = chunk_metadata(document_id, base, &raw.content, options.infer_metadata, created_at);
            let quality = assess_chunk(&raw.content, &metadata, options);
            let embedding_ready = is_embedding_ready(&raw.content, quality.score, options);
            if !embedding_ready {
                errors.push(
                    CapturedError::warning(
                        Stage::Quality,
                        format!("chunk not embedding-ready (quality {:.2})", quality.score),
                    )
                    .for_chunk(&id),
                );
            }
            chunks.push(Chunk {
                id,
                word_count: raw.content.split_whitespace().count(),
                char_count: raw.content.chars().count(),
                content: raw.content,
                index,
                metadata,
                quality_score: quality.score,
                embedding_ready,
            });
            qualities.push(quality);
        }
        if chunks.is_empty() {
            errors.push(CapturedError::error(Stage::Chunking, "no chunks produced"));
        }

        let relationships = if options.extract_relationships {
            relationships::extract(&chunks, options)
        } else {
            Vec::new()
        };
        let mut metadata = if options.infer_metadata { enrich(base, &text) } else { base.clone() };
        metadata.created_at = Some(created_at);
        let quality_report = document_report(&chunks, &qualities, split.discarded.len(), options);

        info!(
            document = document_id,
            chunks = chunks.len(),
            relationships = relationships.len(),
            quality = quality_report.overall_score,
            "document processed"
        );
        Ok(ProcessedDocument {
            document_id: document_id.to_string(),
            chunks,
            metadata,
            quality_report,
            relationships,
            errors,
        })
    }

    /// Process documents in groups of `batch_size`, each group concurrently on
    /// blocking tasks, pausing `batch_delay_ms` between groups. A failing
    /// document never aborts the batch.
    pub async fn process_batch(&self, inputs: Vec<DocumentInput>) -> BatchOutcome {
        let batch_size = self.options.batch_size.max(1);
        let delay = Duration::from_millis(self.options.batch_delay_ms);
        let total_groups = inputs.len().div_ceil(batch_size);
        let mut outcome = BatchOutcome::default();

        let mut pending = inputs.into_iter().peekable();
        let mut group_no = 0;
        while pending.peek().is_some() {
            let group: Vec<DocumentInput> = pending.by_ref().take(batch_size).collect();
            let ids: Vec<String> = group.iter().map(|input| input.document_id.clone()).collect();
            let tasks = group.into_iter().map(|input| {
                let processor = self.clone();
                tokio::task::spawn_blocking(move || {
                    processor.process(&input.document_id, &input.content, &input.metadata, input.options.as_ref())
                })
            });
            let results = join_all(tasks).await;

            for (document_id, joined) in ids.into_iter().zip(results) {
                let result = joined.unwrap_or_else(|e| Err(Error::Processing(format!("processing task failed: {e}"))));
                match result {
                    Ok(doc) => outcome.processed.push(doc),
                    Err(error) => {
                        warn!(document = %document_id, %error, "document failed");
                        outcome.failures.push(DocumentFailure { document_id, error });
                    }
                }
            }
            group_no += 1;
            debug!(group = group_no, total_groups, "document group done");
            if pending.peek().is_some() && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        info!(processed = outcome.processed.len(), failed = outcome.failures.len(), "batch complete");
        outcome
    }
}

fn validate(document_id: &str, content: &str, base: &DocumentMetadata, options: &ProcessingOptions) -> Result<()> {
    if document_id.trim().is_empty() {
        return Err(Error::Validation("document id is empty".to_string()));
    }
    if content.trim().is_empty() {
        return Err(Error::Validation("content is empty".to_string()));
    }
    let len = content.chars().count();
    if len < MIN_CONTENT_CHARS {
        return Err(Error::Validation(format!("content is {len} chars, minimum is {MIN_CONTENT_CHARS}")));
    }
    if len > MAX_CONTENT_CHARS {
        return Err(Error::Validation(format!("content is {len} chars, maximum is {MAX_CONTENT_CHARS}")));
    }
    if base.title.trim().is_empty() {
        return Err(Error::Validation("title is required".to_string()));
    }
    if base.category.trim().is_empty() {
        return Err(Error::Validation("category is required".to_string()));
    }
    options.check().map_err(Error::Validation)
}
