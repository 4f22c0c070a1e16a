//! Inter-chunk edges within one document.

use std::collections::HashSet;

use coachkb_core::config::ProcessingOptions;
use coachkb_core::types::{Chunk, ChunkRelationship, ChunkType, RelationshipType};

const CONNECTORS: [&str; 14] = [
    "however",
    "therefore",
    "furthermore",
    "moreover",
    "additionally",
    "consequently",
    "nevertheless",
    "similarly",
    "in addition",
    "as a result",
    "on the other hand",
    "thus",
    "hence",
    "also",
];

const PRONOUNS: [&str; 9] = ["this", "that", "these", "those", "it", "they", "he", "she", "such"];

pub const CONNECTOR_STRENGTH: f32 = 0.8;
pub const PRONOUN_STRENGTH: f32 = 0.6;
pub const WEAK_STRENGTH: f32 = 0.3;
pub const EXAMPLE_STRENGTH: f32 = 0.7;
pub const PREREQUISITE_STRENGTH: f32 = 0.6;

/// How strongly `next` reads as a continuation of the chunk before it.
pub fn continuation_strength(next: &str) -> f32 {
    let lower = next.trim_start().to_lowercase();
    if CONNECTORS.iter().any(|c| opens_with(&lower, c)) {
        CONNECTOR_STRENGTH
    } else if PRONOUNS.iter().any(|p| opens_with(&lower, p)) {
        PRONOUN_STRENGTH
    } else {
        WEAK_STRENGTH
    }
}

fn opens_with(lower: &str, phrase: &str) -> bool {
    lower.strip_prefix(phrase).is_some_and(|rest| rest.chars().next().map_or(true, |c| !c.is_alphanumeric()))
}

fn word_set(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Jaccard similarity of the lower-cased word sets.
pub fn jaccard(a: &str, b: &str) -> f32 {
    set_jaccard(&word_set(a), &word_set(b))
}

fn set_jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f32 / union as f32
}

fn edge(source: &Chunk, related: &Chunk, kind: RelationshipType, strength: f32) -> ChunkRelationship {
    ChunkRelationship {
        source_chunk_id: source.id.clone(),
        related_chunk_id: related.id.clone(),
        relationship_type: kind,
        strength,
    }
}

/// Continuation, example and prerequisite edges between neighbours, then
/// reference edges over all pairs (bounded by `relationship_window` when set).
pub fn extract(chunks: &[Chunk], options: &ProcessingOptions) -> Vec<ChunkRelationship> {
    let mut edges = Vec::new();

    for pair in chunks.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        let strength = continuation_strength(&next.content);
        if strength > options.continuation_threshold {
            edges.push(edge(prev, next, RelationshipType::Continuation, strength));
        }
        if next.metadata.chunk_type == ChunkType::Example {
            edges.push(edge(next, prev, RelationshipType::Example, EXAMPLE_STRENGTH));
        }
        if let (Some(a), Some(b)) = (prev.metadata.complexity_level, next.metadata.complexity_level) {
            if b > a {
                edges.push(edge(prev, next, RelationshipType::Prerequisite, PREREQUISITE_STRENGTH));
            }
        }
    }

    let sets: Vec<HashSet<String>> = chunks.iter().map(|c| word_set(&c.content)).collect();
    for i in 0..chunks.len() {
        let upper = options
            .relationship_window
            .map_or(chunks.len(), |w| i.saturating_add(w).saturating_add(1).min(chunks.len()));
        for j in (i + 1)..upper {
            let strength = set_jaccard(&sets[i], &sets[j]);
            if strength > options.reference_threshold {
                edges.push(edge(&chunks[i], &chunks[j], RelationshipType::Reference, strength));
            }
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coachkb_core::types::{ChunkMetadata, ComplexityLevel};
    use std::collections::BTreeSet;

    fn chunk(index: usize, content: &str) -> Chunk {
        Chunk {
            id: Chunk::make_id("doc", index),
            content: content.to_string(),
            index,
            metadata: ChunkMetadata {
                source_document_id: "doc".to_string(),
                title: "Doc".to_string(),
                category: "practices".to_string(),
                author: None,
                methodology: None,
                life_area: None,
                complexity_level: None,
                evidence_level: None,
                tags: BTreeSet::new(),
                created_at: Utc::now(),
                chunk_type: ChunkType::Content,
            },
            quality_score: 0.8,
            word_count: content.split_whitespace().count(),
            char_count: content.chars().count(),
            embedding_ready: true,
        }
    }

    fn of_type(edges: &[ChunkRelationship], kind: RelationshipType) -> Vec<&ChunkRelationship> {
        edges.iter().filter(|e| e.relationship_type == kind).collect()
    }

    /// Near-duplicates at positions 0 and 2 with an unrelated chunk between.
    fn spaced_duplicates() -> Vec<Chunk> {
        vec![
            chunk(0, "Gratitude journal daily practice builds optimism"),
            chunk(1, "Sleep routines need a consistent evening wind down"),
            chunk(2, "Gratitude journal daily practice steadily builds optimism"),
        ]
    }

    #[test]
    fn near_duplicates_get_reference_edge() {
        let edges = extract(&spaced_duplicates(), &ProcessingOptions::default());
        let refs = of_type(&edges, RelationshipType::Reference);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].source_chunk_id, "doc_chunk_0");
        assert_eq!(refs[0].related_chunk_id, "doc_chunk_2");
        assert!(refs[0].strength > 0.7);
    }

    #[test]
    fn window_bounds_reference_pass() {
        let chunks = spaced_duplicates();
        let narrow = ProcessingOptions { relationship_window: Some(1), ..Default::default() };
        assert!(of_type(&extract(&chunks, &narrow), RelationshipType::Reference).is_empty());

        let wide = ProcessingOptions { relationship_window: Some(2), ..Default::default() };
        assert_eq!(of_type(&extract(&chunks, &wide), RelationshipType::Reference).len(), 1);

        let huge = ProcessingOptions { relationship_window: Some(usize::MAX), ..Default::default() };
        assert_eq!(extract(&chunks, &huge), extract(&chunks, &ProcessingOptions::default()));
    }

    #[test]
    fn example_chunk_points_back_at_predecessor() {
        let mut chunks = vec![
            chunk(0, "Values clarification starts with listing what matters"),
            chunk(1, "For example, one client ranked family above income"),
        ];
        chunks[1].metadata.chunk_type = ChunkType::Example;
        let edges = extract(&chunks, &ProcessingOptions::default());
        let examples = of_type(&edges, RelationshipType::Example);
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].source_chunk_id, "doc_chunk_1");
        assert_eq!(examples[0].related_chunk_id, "doc_chunk_0");
        assert_eq!(examples[0].strength, EXAMPLE_STRENGTH);
    }

    #[test]
    fn complexity_step_up_is_prerequisite() {
        let mut chunks = vec![
            chunk(0, "Start by naming one habit you want"),
            chunk(1, "Stack habits into layered identity systems"),
            chunk(2, "Return to single habits when overwhelmed"),
        ];
        chunks[0].metadata.complexity_level = Some(ComplexityLevel::Beginner);
        chunks[1].metadata.complexity_level = Some(ComplexityLevel::Advanced);
        chunks[2].metadata.complexity_level = Some(ComplexityLevel::Beginner);
        let edges = extract(&chunks, &ProcessingOptions::default());
        let prereqs = of_type(&edges, RelationshipType::Prerequisite);
        assert_eq!(prereqs.len(), 1, "stepping down adds no edge");
        assert_eq!(prereqs[0].source_chunk_id, "doc_chunk_0");
        assert_eq!(prereqs[0].related_chunk_id, "doc_chunk_1");
        assert_eq!(prereqs[0].strength, PREREQUISITE_STRENGTH);
    }

    #[test]
    fn connectors_beat_pronouns() {
        assert_eq!(continuation_strength("However, the plan changed."), CONNECTOR_STRENGTH);
        assert_eq!(continuation_strength("  In addition we reviewed goals."), CONNECTOR_STRENGTH);
        assert_eq!(continuation_strength("This matters because..."), PRONOUN_STRENGTH);
        assert_eq!(continuation_strength("Thistles grow everywhere."), WEAK_STRENGTH);
        assert_eq!(continuation_strength("Goals first."), WEAK_STRENGTH);
    }

    #[test]
    fn jaccard_of_word_sets() {
        assert_eq!(jaccard("a b c", "A, b; c!"), 1.0);
        assert_eq!(jaccard("a b", "c d"), 0.0);
        assert!((jaccard("a b c d", "a b c e") - 0.6).abs() < 1e-6);
        assert_eq!(jaccard("", "   "), 0.0);
    }
}
