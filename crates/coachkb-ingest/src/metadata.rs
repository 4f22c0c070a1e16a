//! Keyword-driven metadata inference for chunks and documents.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use coachkb_core::keywords::best_bag;
use coachkb_core::types::{ChunkMetadata, ChunkType, ComplexityLevel, DocumentMetadata, EvidenceLevel};

const COMPLEXITY_BAGS: [(ComplexityLevel, &[&str]); 3] = [
    (
        ComplexityLevel::Beginner,
        &["introduction", "basic", "beginner", "getting started", "simple", "first step", "fundamental"],
    ),
    (ComplexityLevel::Intermediate, &["intermediate", "practice", "develop", "build on", "apply", "technique"]),
    (ComplexityLevel::Advanced, &["advanced", "complex", "mastery", "expert", "in-depth", "sophisticated", "nuanced"]),
];

const METHODOLOGY_BAGS: [(&str, &[&str]); 5] = [
    ("grow", &["grow model", "goal, reality", "way forward", "options and will"]),
    ("cbt", &["cognitive", "behavioral", "behavioural", "thought pattern", "reframe", "distortion"]),
    ("positive-psychology", &["strengths", "gratitude", "well-being", "wellbeing", "flourish", "optimism"]),
    ("mindfulness", &["mindful", "meditation", "present moment", "breathing", "awareness"]),
    ("solution-focused", &["solution-focused", "scaling question", "miracle question", "exceptions"]),
];

const LIFE_AREA_BAGS: [(&str, &[&str]); 5] = [
    ("career", &["career", "job", "workplace", "promotion", "professional", "manager"]),
    ("relationships", &["relationship", "partner", "family", "friend", "marriage", "conflict"]),
    ("health", &["health", "exercise", "sleep", "nutrition", "fitness", "energy"]),
    ("finance", &["money", "finance", "budget", "saving", "debt", "income"]),
    ("personal-growth", &["personal growth", "self-awareness", "confidence", "habit", "purpose", "values"]),
];

const EVIDENCE_BAGS: [(EvidenceLevel, &[&str]); 3] = [
    (
        EvidenceLevel::ResearchBased,
        &["research", "study", "studies", "evidence", "meta-analysis", "peer-reviewed", "experiment"],
    ),
    (EvidenceLevel::Practical, &["worksheet", "exercise", "step", "try this", "practice", "checklist"]),
    (EvidenceLevel::Anecdotal, &["story", "i remember", "a client of mine", "personal experience", "anecdote"]),
];

/// Coaching vocabulary recognized as tags.
const TAG_VOCABULARY: [&str; 16] = [
    "accountability",
    "communication",
    "confidence",
    "feedback",
    "goal",
    "gratitude",
    "habit",
    "leadership",
    "mindfulness",
    "motivation",
    "productivity",
    "reflection",
    "resilience",
    "stress",
    "time management",
    "values",
];

pub fn infer_complexity(text: &str) -> Option<ComplexityLevel> {
    best_bag(text, COMPLEXITY_BAGS)
}

pub fn infer_methodology(text: &str) -> Option<String> {
    best_bag(text, METHODOLOGY_BAGS).map(str::to_string)
}

pub fn infer_life_area(text: &str) -> Option<String> {
    best_bag(text, LIFE_AREA_BAGS).map(str::to_string)
}

pub fn infer_evidence(text: &str) -> Option<EvidenceLevel> {
    best_bag(text, EVIDENCE_BAGS)
}

pub fn extract_tags(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    TAG_VOCABULARY.iter().filter(|term| lower.contains(*term)).map(|term| term.to_string()).collect()
}

/// Classify a chunk by how it opens.
pub fn infer_chunk_type(content: &str) -> ChunkType {
    let opening = content.trim_start();
    let lower: String = opening.chars().take(80).collect::<String>().to_lowercase();
    if opening.starts_with('#') {
        ChunkType::Header
    } else if ["in summary", "to summarize", "summary:", "in conclusion", "key takeaways"]
        .iter()
        .any(|p| lower.starts_with(p))
    {
        ChunkType::Summary
    } else if ["for example", "for instance", "example:", "case study"].iter().any(|p| lower.starts_with(p)) {
        ChunkType::Example
    } else {
        ChunkType::Content
    }
}

/// Fill the optional fields of `base` that are absent, from `text`.
pub fn enrich(base: &DocumentMetadata, text: &str) -> DocumentMetadata {
    let mut meta = base.clone();
    meta.methodology = meta.methodology.or_else(|| infer_methodology(text));
    meta.life_area = meta.life_area.or_else(|| infer_life_area(text));
    meta.complexity_level = meta.complexity_level.or_else(|| infer_complexity(text));
    meta.evidence_level = meta.evidence_level.or_else(|| infer_evidence(text));
    meta.tags.extend(extract_tags(text));
    meta
}

/// Metadata for one chunk: base fields, optionally enriched from the chunk text.
pub fn chunk_metadata(
    document_id: &str,
    base: &DocumentMetadata,
    content: &str,
    infer: bool,
    created_at: DateTime<Utc>,
) -> ChunkMetadata {
    let meta = if infer { enrich(base, content) } else { base.clone() };
    ChunkMetadata {
        source_document_id: document_id.to_string(),
        title: meta.title,
        category: meta.category,
        author: meta.author,
        methodology: meta.methodology,
        life_area: meta.life_area,
        complexity_level: meta.complexity_level,
        evidence_level: meta.evidence_level,
        tags: meta.tags,
        created_at: meta.created_at.unwrap_or(created_at),
        chunk_type: infer_chunk_type(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inference_picks_dominant_bag() {
        let text = "An advanced, in-depth look at expert coaching. A basic note.";
        assert_eq!(infer_complexity(text), Some(ComplexityLevel::Advanced));
        assert_eq!(infer_life_area("Sleep, nutrition and a job"), Some("health".to_string()));
        assert_eq!(infer_evidence("A meta-analysis of research studies"), Some(EvidenceLevel::ResearchBased));
        assert_eq!(infer_methodology("plain words"), None);
    }

    #[test]
    fn base_fields_are_never_overwritten() {
        let mut base = DocumentMetadata::new("T", "C");
        base.life_area = Some("finance".to_string());
        base.tags.insert("custom".to_string());
        let meta = chunk_metadata("doc", &base, "Career growth and gratitude habits", true, Utc::now());
        assert_eq!(meta.life_area.as_deref(), Some("finance"));
        assert!(meta.tags.contains("custom"));
        assert!(meta.tags.contains("gratitude"));
        assert!(meta.tags.contains("habit"));
        assert_eq!(meta.source_document_id, "doc");
    }

    #[test]
    fn inference_can_be_disabled() {
        let base = DocumentMetadata::new("T", "C");
        let meta = chunk_metadata("doc", &base, "Career job promotion", false, Utc::now());
        assert!(meta.life_area.is_none());
        assert!(meta.tags.is_empty());
    }

    #[test]
    fn chunk_type_from_opening() {
        assert_eq!(infer_chunk_type("# Goals\n\nText"), ChunkType::Header);
        assert_eq!(infer_chunk_type("In summary, keep going."), ChunkType::Summary);
        assert_eq!(infer_chunk_type("For example, Sam wrote daily."), ChunkType::Example);
        assert_eq!(infer_chunk_type("Plain prose."), ChunkType::Content);
    }
}
