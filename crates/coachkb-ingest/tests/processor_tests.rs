use coachkb_core::config::ProcessingOptions;
use coachkb_core::types::{ComplexityLevel, DocumentMetadata, RelationshipType};
use coachkb_core::{Error, Severity, Stage};
use coachkb_ingest::{DocumentInput, DocumentProcessor};

fn base() -> DocumentMetadata {
    DocumentMetadata::new("Habit Foundations", "habits")
}

/// Roughly 6000 chars of varied coaching prose with sentence boundaries.
fn long_document() -> String {
    let sentences = [
        "Small habits compound when they are repeated every day.",
        "A coach helps the client notice the cue that starts a routine.",
        "Reflection at the end of each week keeps the goal visible.",
        "Accountability partners make it easier to recover after a missed day.",
        "Celebrate progress early so motivation has something to hold on to.",
        "Write the next action down and keep it small enough to finish.",
    ];
    let mut text = String::new();
    let mut i = 0;
    while text.chars().count() < 6000 {
        text.push_str(sentences[i % sentences.len()]);
        text.push(' ');
        if i % 9 == 8 {
            text.push_str("\n\n");
        }
        i += 1;
    }
    text
}

#[test]
fn six_thousand_chars_yield_bounded_overlapping_chunks() {
    let processor = DocumentProcessor::default();
    let content = long_document();
    let doc = processor.process("doc-1", &content, &base(), None).expect("process");

    assert!(doc.chunks.len() >= 6, "got {} chunks", doc.chunks.len());
    for (i, chunk) in doc.chunks.iter().enumerate() {
        assert_eq!(chunk.id, format!("doc-1_chunk_{i}"));
        assert_eq!(chunk.index, i);
        assert!(chunk.char_count <= 1000, "chunk {i} has {} chars", chunk.char_count);
        assert_eq!(chunk.metadata.title, "Habit Foundations");
        assert_eq!(chunk.metadata.category, "habits");
    }
    for pair in doc.chunks.windows(2) {
        let head: String = pair[1].content.chars().take(30).collect();
        assert!(pair[0].content.contains(&head), "consecutive chunks overlap");
    }
}

#[test]
fn overlap_accounting_holds() {
    let options = ProcessingOptions::default();
    let processor = DocumentProcessor::new(options.clone());
    let content = long_document();
    let doc = processor.process("doc-2", &content, &base(), None).expect("process");

    let preprocessed_len = coachkb_ingest::preprocess::preprocess(&content, options.preserve_structure).chars().count();
    let total: usize = doc.chunks.iter().map(|c| c.char_count).sum();
    assert!(total >= preprocessed_len - (doc.chunks.len() - 1) * options.chunk_overlap);
}

#[test]
fn quality_is_bounded_and_gates_readiness() {
    let options = ProcessingOptions::default();
    let processor = DocumentProcessor::new(options.clone());
    let doc = processor.process("doc-3", &long_document(), &base(), None).expect("process");
    for chunk in &doc.chunks {
        assert!((0.0..=1.0).contains(&chunk.quality_score));
        if chunk.embedding_ready {
            assert!(chunk.quality_score >= options.min_quality_score);
        }
    }
    let report = &doc.quality_report;
    assert!((0.0..=1.0).contains(&report.overall_score));
}

#[test]
fn empty_and_short_content_fail_validation() {
    let processor = DocumentProcessor::default();
    for content in ["", "short", "   \n\t  "] {
        let err = processor.process("doc", content, &base(), None).expect_err("invalid");
        assert!(matches!(err, Error::Validation(_)), "{content:?} gave {err}");
    }
    let err = processor
        .process("doc", "long enough content", &DocumentMetadata::new("", "cat"), None)
        .expect_err("title required");
    assert!(matches!(err, Error::Validation(_)));
    let err = processor.process("", "long enough content", &base(), None).expect_err("id required");
    assert!(matches!(err, Error::Validation(_)));

    let bad = ProcessingOptions { chunk_overlap: 1000, ..ProcessingOptions::default() };
    let err = processor.process("doc", "long enough content", &base(), Some(&bad)).expect_err("incoherent options");
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn short_document_is_one_chunk_with_warning() {
    let processor = DocumentProcessor::default();
    let doc = processor.process("tiny", "Breathe in for four counts.", &base(), None).expect("process");
    assert_eq!(doc.chunks.len(), 1);
    assert!(!doc.chunks[0].embedding_ready, "below min_chunk_size is never embedding-ready");
    assert!(doc
        .errors
        .iter()
        .any(|e| e.stage == Stage::Quality && e.severity == Severity::Warning && e.chunk_id.as_deref() == Some("tiny_chunk_0")));
}

#[test]
fn base_metadata_wins_over_inference() {
    let mut meta = base();
    meta.complexity_level = Some(ComplexityLevel::Beginner);
    let content = "An advanced and complex framework for expert coaches who want mastery. ".repeat(4);
    let doc = DocumentProcessor::default().process("doc", &content, &meta, None).expect("process");
    assert!(doc.chunks.iter().all(|c| c.metadata.complexity_level == Some(ComplexityLevel::Beginner)));

    let inferred = DocumentProcessor::default().process("doc", &content, &base(), None).expect("process");
    assert_eq!(inferred.metadata.complexity_level, Some(ComplexityLevel::Advanced));
}

#[test]
fn relationships_follow_options() {
    let options = ProcessingOptions { chunk_size: 200, chunk_overlap: 0, min_chunk_size: 50, ..Default::default() };
    let content = format!(
        "{}\n\nHowever, {}\n\nFor example, {}",
        "Setting goals starts with a clear picture of what success looks like for the client in their own words.",
        "goals without a weekly review tend to drift quietly until the client no longer remembers them at all.",
        "one client wrote three priorities on a card and read it aloud every Monday before opening email."
    );
    let processor = DocumentProcessor::new(options.clone());
    let doc = processor.process("rel", &content, &base(), None).expect("process");
    assert!(doc.chunks.len() >= 2);
    assert!(doc.relationships.iter().any(|r| r.relationship_type == RelationshipType::Continuation && r.strength == 0.8));
    for r in &doc.relationships {
        assert!(r.strength > 0.0 && r.strength <= 1.0);
        assert_ne!(r.source_chunk_id, r.related_chunk_id);
    }

    let off = ProcessingOptions { extract_relationships: false, ..options };
    let doc = processor.process("rel", &content, &base(), Some(&off)).expect("process");
    assert!(doc.relationships.is_empty());
}

#[test]
fn unbounded_relationship_window_matches_default() {
    let processor = DocumentProcessor::default();
    let content = long_document();
    let unbounded = ProcessingOptions { relationship_window: Some(usize::MAX), ..Default::default() };

    let doc = processor.process("win", &content, &base(), Some(&unbounded)).expect("process");
    let reference = processor.process("win", &content, &base(), None).expect("process");

    assert!(doc.chunks.len() >= 6);
    assert_eq!(doc.relationships, reference.relationships);
}

#[tokio::test]
async fn batch_isolates_failures_and_keeps_going() {
    let options = ProcessingOptions { batch_size: 2, batch_delay_ms: 1, ..Default::default() };
    let processor = DocumentProcessor::new(options);
    let inputs = vec![
        DocumentInput::new("a", long_document(), base()),
        DocumentInput::new("b", "short", base()),
        DocumentInput::new("c", "Gratitude journaling works best when entries are specific and written daily.", base()),
        DocumentInput::new("d", "", base()),
        DocumentInput::new("e", long_document(), base()),
    ];

    let outcome = processor.process_batch(inputs).await;

    let processed: Vec<&str> = outcome.processed.iter().map(|d| d.document_id.as_str()).collect();
    assert_eq!(processed, vec!["a", "c", "e"]);
    let failed: Vec<&str> = outcome.failures.iter().map(|f| f.document_id.as_str()).collect();
    assert_eq!(failed, vec!["b", "d"]);
    assert!(outcome.failures.iter().all(|f| matches!(f.error, Error::Validation(_))));
}
