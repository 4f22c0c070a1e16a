//! coachkb-hybrid
//!
//! Hybrid retrieval: semantic nearest-neighbour search and lexical search run
//! concurrently and merged with Reciprocal Rank Fusion, plus the
//! domain-aware retrieval service built on top.

pub mod engine;
pub mod fusion;
pub mod service;

pub use engine::{HybridSearchEngine, SearchOptions};
pub use fusion::{fuse, rrf_contribution, FusionWeights, RRF_K};
pub use service::{DomainRetrievalService, DomainSearchResponse};
