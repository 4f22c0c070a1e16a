//! coachkb-embed
//!
//! Embedding service (text preparation, dimensionality checks, batched
//! concurrent embedding) over any [`EmbeddingProvider`], plus a deterministic
//! hash embedder for development and tests.

pub mod hash;
pub mod prepare;
pub mod service;

use std::sync::Arc;

use coachkb_core::config::EmbeddingConfig;
use coachkb_core::traits::EmbeddingProvider;
use coachkb_core::{Error, Result};

pub use hash::HashEmbedder;
pub use prepare::prepare_text;
pub use service::EmbeddingService;

/// Build the provider named by `config.model`. Only the built-in hash
/// embedder is known here; remote providers are injected by the caller
/// through [`EmbeddingService::new`].
pub fn provider_from_config(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.model.as_str() {
        "hash" => {
            tracing::info!(dim = config.dimension, "using hash embedder");
            Ok(Arc::new(HashEmbedder::new(config.dimension)))
        }
        other => Err(Error::InvalidConfig(format!("unknown embedding model '{other}'"))),
    }
}

pub fn default_service(config: &EmbeddingConfig) -> Result<EmbeddingService> {
    Ok(EmbeddingService::new(provider_from_config(config)?, config.clone()))
}
