//! coachkb-ingest
//!
//! Document processing (preprocessing, sliding-window chunking, metadata
//! inference, quality scoring, relationship extraction) and the ingestion
//! pipeline that embeds and persists the resulting chunks.

pub mod chunker;
pub mod metadata;
pub mod pipeline;
pub mod preprocess;
pub mod processor;
pub mod quality;
pub mod relationships;

pub use pipeline::{IngestFailure, IngestOutcome, IngestReport, KnowledgeIngestor};
pub use processor::{BatchOutcome, DocumentFailure, DocumentInput, DocumentProcessor, ProcessedDocument};
