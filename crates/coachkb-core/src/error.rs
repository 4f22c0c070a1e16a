//! Error taxonomy and captured, non-fatal pipeline errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Structurally invalid input. Never retried.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Processing failed: {0}")]
    Processing(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Whether a retry loop may attempt the operation again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Processing(_) | Error::Embedding(_) | Error::Search(_))
    }

    pub fn severity(&self) -> Severity {
        match self {
            Error::Validation(_) | Error::InvalidConfig(_) => Severity::Fatal,
            Error::Processing(_) => Severity::Warning,
            Error::Embedding(_) | Error::Search(_) | Error::NotFound(_) => Severity::Error,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

/// Where in the pipeline a captured error originated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Chunking,
    Quality,
    Embedding,
    Persistence,
}

/// A non-fatal error reported next to a best-effort result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CapturedError {
    pub severity: Severity,
    pub stage: Stage,
    pub message: String,
    pub chunk_id: Option<String>,
}

impl CapturedError {
    pub fn warning(stage: Stage, message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, stage, message: message.into(), chunk_id: None }
    }

    pub fn error(stage: Stage, message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, stage, message: message.into(), chunk_id: None }
    }

    pub fn for_chunk(mut self, chunk_id: impl Into<String>) -> Self {
        self.chunk_id = Some(chunk_id.into());
        self
    }
}
