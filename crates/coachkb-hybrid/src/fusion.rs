//! Reciprocal Rank Fusion (RRF) of semantic and lexical result lists.

use std::collections::HashMap;

use coachkb_core::config::RetrievalConfig;
use coachkb_core::types::SearchResult;

/// Standard RRF k parameter (Cormack, Clarke and Buettcher, SIGIR 2009).
pub const RRF_K: f32 = 60.0;

/// Contribution of the result at 0-indexed `rank`: `1 / (k + rank + 1)`.
pub fn rrf_contribution(rank: usize, k: f32) -> f32 {
    1.0 / (k + rank as f32 + 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub k: f32,
    pub semantic: f32,
    pub text: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self { k: RRF_K, semantic: 0.7, text: 0.3 }
    }
}

impl From<&RetrievalConfig> for FusionWeights {
    fn from(config: &RetrievalConfig) -> Self {
        Self { k: config.rrf_k, semantic: config.semantic_weight, text: config.text_weight }
    }
}

/// Fuse two ranked lists into at most `limit` results.
///
/// Each result's `similarity` becomes its weighted similarity (the max over
/// the lists it appears in); ordering is by summed RRF score. Entries keep
/// first-seen order on ties, semantic before text, so the output is
/// deterministic for identical inputs.
pub fn fuse(
    semantic: Vec<SearchResult>,
    text: Vec<SearchResult>,
    weights: &FusionWeights,
    limit: usize,
) -> Vec<SearchResult> {
    let mut entries: Vec<(SearchResult, f32)> = Vec::with_capacity(semantic.len() + text.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    let lists = [(semantic, weights.semantic), (text, weights.text)];
    for (list, weight) in lists {
        for (rank, mut result) in list.into_iter().enumerate() {
            let score = rrf_contribution(rank, weights.k);
            let similarity = result.similarity * weight;
            match positions.get(&result.id) {
                Some(&pos) => {
                    let entry = &mut entries[pos];
                    entry.1 += score;
                    entry.0.similarity = entry.0.similarity.max(similarity);
                }
                None => {
                    positions.insert(result.id.clone(), entries.len());
                    result.similarity = similarity;
                    entries.push((result, score));
                }
            }
        }
    }

    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries.truncate(limit);
    entries.into_iter().map(|(result, _)| result).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coachkb_core::types::{ChunkMetadata, ChunkType, DocumentRef};
    use std::collections::BTreeSet;

    fn hit(id: &str, similarity: f32) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            content: String::new(),
            similarity,
            metadata: ChunkMetadata {
                source_document_id: "d".to_string(),
                title: "t".to_string(),
                category: "c".to_string(),
                author: None,
                methodology: None,
                life_area: None,
                complexity_level: None,
                evidence_level: None,
                tags: BTreeSet::new(),
                created_at: Utc::now(),
                chunk_type: ChunkType::Content,
            },
            document: DocumentRef { id: "d".to_string(), title: "t".to_string(), category: "c".to_string(), author: None },
            chunk_index: 0,
            scoring: None,
        }
    }

    fn ids(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn agreement_beats_higher_single_list_similarity() {
        let semantic = vec![hit("only-semantic", 0.9), hit("both", 0.6)];
        let text = vec![hit("both", 0.85)];

        let fused = fuse(semantic, text, &FusionWeights::default(), 10);

        assert_eq!(ids(&fused), vec!["both", "only-semantic"]);
        assert!((fused[0].similarity - 0.6 * 0.7).abs() < 1e-6, "max(0.42, 0.255)");
        assert!((fused[1].similarity - 0.9 * 0.7).abs() < 1e-6);
    }

    #[test]
    fn contribution_uses_zero_indexed_rank() {
        assert!((rrf_contribution(0, RRF_K) - 1.0 / 61.0).abs() < 1e-9);
        assert!((rrf_contribution(1, RRF_K) - 1.0 / 62.0).abs() < 1e-9);
    }

    #[test]
    fn ties_keep_first_seen_order_and_repeat_identically() {
        let run = || {
            fuse(
                vec![hit("s0", 0.9), hit("s1", 0.8)],
                vec![hit("t0", 0.9), hit("t1", 0.8)],
                &FusionWeights::default(),
                10,
            )
        };
        let first = run();
        assert_eq!(ids(&first), vec!["s0", "t0", "s1", "t1"]);
        let second = run();
        assert_eq!(ids(&first), ids(&second));
        let sims = |r: &[SearchResult]| r.iter().map(|x| x.similarity).collect::<Vec<_>>();
        assert_eq!(sims(&first), sims(&second));
    }

    #[test]
    fn truncates_and_handles_empty_lists() {
        let fused = fuse(vec![hit("a", 0.5), hit("b", 0.4), hit("c", 0.3)], Vec::new(), &FusionWeights::default(), 2);
        assert_eq!(ids(&fused), vec!["a", "b"]);
        assert!(fuse(Vec::new(), Vec::new(), &FusionWeights::default(), 5).is_empty());
        assert!(fuse(vec![hit("a", 0.5)], vec![hit("a", 0.9)], &FusionWeights::default(), 0).is_empty());
    }
}
