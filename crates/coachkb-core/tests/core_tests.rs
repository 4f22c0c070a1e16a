use std::fs;
use tempfile::TempDir;

use coachkb_core::config::{Config, ProcessingOptions};
use coachkb_core::traits::StoreFilter;
use coachkb_core::types::{Chunk, ComplexityLevel, DocumentMetadata, EvidenceLevel};
use coachkb_core::{Error, Severity};

#[test]
fn defaults_survive_empty_toml() {
    let config = Config::from_toml_str("").expect("config");
    let settings = config.settings().expect("settings");
    assert_eq!(settings.processing.chunk_size, 1000);
    assert_eq!(settings.processing.chunk_overlap, 200);
    assert_eq!(settings.retrieval.rrf_k, 60.0);
    assert_eq!(settings.embedding.dimension, 384);
    assert_eq!(settings.ingest.max_concurrency, 3);
}

#[test]
fn toml_overrides_nested_values() {
    let config = Config::from_toml_str(
        r#"
        [processing]
        chunk_size = 800
        chunk_overlap = 100

        [retrieval]
        hybrid_enabled = false
        "#,
    )
    .expect("config");
    let settings = config.settings().expect("settings");
    assert_eq!(settings.processing.chunk_size, 800);
    assert_eq!(settings.processing.chunk_overlap, 100);
    assert_eq!(settings.processing.min_chunk_size, 100, "untouched keys keep defaults");
    assert!(!settings.retrieval.hybrid_enabled);
}

#[test]
fn incoherent_chunking_is_rejected() {
    let err = Config::from_toml_str("[processing]\nchunk_size = 100\nchunk_overlap = 100\n");
    assert!(err.is_err(), "overlap equal to chunk size must be rejected");

    let mut options = ProcessingOptions::default();
    options.max_chunk_size = 500;
    assert!(options.check().is_err(), "chunk_size above max_chunk_size");
}

#[test]
fn load_from_reads_files_in_base_dir() {
    coachkb_core::telemetry::init_tracing("coachkb_core=debug");
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[embedding]\ndimension = 16\n").unwrap();
    fs::write(tmp.path().join("config.test.toml"), "[embedding]\nbatch_size = 4\n").unwrap();
    std::env::set_var("RUST_ENV", "test");

    let config = Config::load_from(tmp.path()).expect("load");
    let settings = config.settings().expect("settings");
    assert_eq!(settings.embedding.dimension, 16);
    assert_eq!(settings.embedding.batch_size, 4);
}

#[test]
fn find_and_table_keys_on_domain_tables() {
    let config = Config::from_toml_str(
        r#"
        [domains.life-coaching]
        minimum_relevance_score = 0.6
        [domains.career-coaching]
        minimum_relevance_score = 0.7
        "#,
    )
    .expect("config");
    let mut keys = config.table_keys("domains");
    keys.sort();
    assert_eq!(keys, vec!["career-coaching".to_string(), "life-coaching".to_string()]);
    let missing: Option<f32> = config.find("domains.unknown.minimum_relevance_score").expect("find");
    assert!(missing.is_none());
    let present: Option<f32> = config.find("domains.life-coaching.minimum_relevance_score").expect("find");
    assert_eq!(present, Some(0.6));
}

#[test]
fn chunk_ids_are_deterministic() {
    assert_eq!(Chunk::make_id("doc-1", 0), "doc-1_chunk_0");
    assert_eq!(Chunk::make_id("doc-1", 12), "doc-1_chunk_12");
}

#[test]
fn store_filter_scopes_domain_and_category() {
    let filter = StoreFilter::for_domain("life-coaching").with_category(Some("habits".to_string()));
    assert!(filter.matches("life-coaching", "habits"));
    assert!(!filter.matches("career-coaching", "habits"));
    assert!(!filter.matches("life-coaching", "career"));
    assert!(StoreFilter::default().matches("anything", "any"));
}

#[test]
fn enums_use_wire_names() {
    assert_eq!(serde_json::to_string(&EvidenceLevel::ResearchBased).unwrap(), "\"research-based\"");
    assert_eq!(serde_json::to_string(&ComplexityLevel::Advanced).unwrap(), "\"advanced\"");
    let meta: DocumentMetadata =
        serde_json::from_str(r#"{"title":"T","category":"C","evidence_level":"practical"}"#).unwrap();
    assert_eq!(meta.evidence_level, Some(EvidenceLevel::Practical));
}

#[test]
fn error_severity_and_retry_policy() {
    let validation = Error::Validation("empty".to_string());
    assert_eq!(validation.severity(), Severity::Fatal);
    assert!(!validation.is_retryable());
    assert!(Error::Search("timeout".to_string()).is_retryable());
    assert!(Severity::Warning < Severity::Fatal);
}
