//! Dimension-checked embedding with batching.

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use coachkb_core::config::EmbeddingConfig;
use coachkb_core::traits::EmbeddingProvider;
use coachkb_core::{Error, Result};

use crate::prepare::prepare_text;

/// Wraps an [`EmbeddingProvider`] with input preparation, dimensionality
/// validation and batched fan-out.
#[derive(Clone)]
pub struct EmbeddingService {
    provider: Arc<dyn EmbeddingProvider>,
    config: EmbeddingConfig,
}

impl EmbeddingService {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, config: EmbeddingConfig) -> Self {
        Self { provider, config }
    }

    pub fn model_id(&self) -> &str {
        self.provider.model_id()
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// Embed one text. Fails with [`Error::Embedding`] on provider failure or
    /// when the returned vector does not have the configured dimensionality.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let prepared = prepare_text(text, self.config.max_input_chars);
        if prepared.is_empty() {
            return Err(Error::Embedding("nothing left to embed after preparation".to_string()));
        }
        let vector = self
            .provider
            .embed(&prepared)
            .await
            .map_err(|e| Error::Embedding(format!("{}: {e:#}", self.provider.model_id())))?;
        if vector.len() != self.config.dimension {
            return Err(Error::Embedding(format!(
                "dimension mismatch: got {} expected {}",
                vector.len(),
                self.config.dimension
            )));
        }
        Ok(vector)
    }

    /// Embed many texts in fixed-size batches. Items inside a batch run
    /// concurrently; batches are separated by a short pause. One result per
    /// input, in input order; a failing item never aborts the rest.
    pub async fn embed_batch(&self, texts: &[String]) -> Vec<Result<Vec<f32>>> {
        let batch_size = self.config.batch_size.max(1);
        let pause = Duration::from_millis(self.config.batch_pause_ms);
        let total_batches = texts.len().div_ceil(batch_size);
        let mut out = Vec::with_capacity(texts.len());
        for (batch_no, batch) in texts.chunks(batch_size).enumerate() {
            let results = join_all(batch.iter().map(|t| self.embed(t))).await;
            let failed = results.iter().filter(|r| r.is_err()).count();
            if failed > 0 {
                warn!(batch = batch_no + 1, failed, "embedding batch had failures");
            }
            debug!(batch = batch_no + 1, total_batches, size = batch.len(), "embedded batch");
            out.extend(results);
            if batch_no + 1 < total_batches && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }
        out
    }
}
