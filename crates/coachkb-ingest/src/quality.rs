//! Additive quality heuristics for chunks and whole documents.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use coachkb_core::config::ProcessingOptions;
use coachkb_core::types::{Chunk, ChunkMetadata, QualityReport};

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+(\s|$)").expect("valid regex"));
static LIST_OR_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(#{1,6}\s|[-*\u{2022}]\s|\d+[.)]\s)").expect("valid regex"));

/// Sub-scores of one chunk, each in `[0,1]`, and their weighted total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkQuality {
    pub score: f32,
    pub content: f32,
    pub structure: f32,
    pub metadata: f32,
    pub embedding: f32,
}

pub fn assess_chunk(content: &str, metadata: &ChunkMetadata, options: &ProcessingOptions) -> ChunkQuality {
    let content_score = content_score(content, options);
    let structure = structure_score(content);
    let metadata_score = metadata.core_fields_populated() as f32 / 6.0;
    let embedding = embedding_score(content, options);
    let w = options.quality_weights;
    let score = w.content * content_score + w.structure * structure + w.metadata * metadata_score + w.embedding * embedding;
    ChunkQuality {
        score: score.clamp(0.0, 1.0),
        content: content_score,
        structure,
        metadata: metadata_score,
        embedding,
    }
}

pub fn is_embedding_ready(content: &str, quality: f32, options: &ProcessingOptions) -> bool {
    let len = content.chars().count();
    !content.trim().is_empty()
        && quality >= options.min_quality_score
        && (options.min_chunk_size..=options.max_chunk_size).contains(&len)
}

fn content_score(content: &str, options: &ProcessingOptions) -> f32 {
    let len = content.chars().count();
    let words: Vec<&str> = content.split_whitespace().collect();
    let mut score = 0.0;

    if (options.min_chunk_size..=options.max_chunk_size).contains(&len) {
        score += 0.3;
    } else if len >= options.min_chunk_size / 2 {
        score += 0.1;
    }

    match sentence_count(content) {
        0 => {}
        1 => score += 0.1,
        _ => score += 0.2,
    }

    if !words.is_empty() {
        let unique: HashSet<String> = words.iter().map(|w| normalize_word(w)).collect();
        let variety = unique.len() as f32 / words.len() as f32;
        if variety > 0.5 {
            score += 0.3;
        } else if variety > 0.3 {
            score += 0.15;
        }
        let avg_len = words.iter().map(|w| w.chars().count()).sum::<usize>() as f32 / words.len() as f32;
        if (3.0..=10.0).contains(&avg_len) {
            score += 0.2;
        }
    }
    f32::min(score, 1.0)
}

fn structure_score(content: &str) -> f32 {
    let trimmed = content.trim();
    let mut score = 0.0;
    if trimmed.chars().next().is_some_and(|c| c.is_uppercase() || c == '#' || c.is_ascii_digit()) {
        score += 0.3;
    }
    if trimmed.ends_with(['.', '!', '?', ':']) {
        score += 0.3;
    }
    if LIST_OR_HEADING.is_match(trimmed) {
        score += 0.2;
    }
    if trimmed.contains("\n\n") || sentence_count(trimmed) >= 3 {
        score += 0.2;
    }
    f32::min(score, 1.0)
}

fn embedding_score(content: &str, options: &ProcessingOptions) -> f32 {
    let len = content.chars().count();
    let mut score = 0.0;
    if (options.min_chunk_size..=options.max_chunk_size).contains(&len) {
        score += 0.4;
    }
    let words = content.split_whitespace().count();
    if words >= 20 {
        score += 0.3;
    } else if words >= 10 {
        score += 0.15;
    }
    let visible: Vec<char> = content.chars().filter(|c| !c.is_whitespace()).collect();
    if !visible.is_empty() {
        let alnum = visible.iter().filter(|c| c.is_alphanumeric()).count();
        if alnum as f32 / visible.len() as f32 >= 0.7 {
            score += 0.3;
        }
    }
    f32::min(score, 1.0)
}

pub(crate) fn sentence_count(text: &str) -> usize {
    SENTENCE_END.find_iter(text).count()
}

fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase()
}

/// Aggregate chunk scores into a document report.
pub fn document_report(
    chunks: &[Chunk],
    qualities: &[ChunkQuality],
    discarded: usize,
    options: &ProcessingOptions,
) -> QualityReport {
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    if qualities.is_empty() {
        issues.push("no chunks were produced".to_string());
        recommendations.push("provide more substantive content".to_string());
        return QualityReport {
            overall_score: 0.0,
            content_score: 0.0,
            structure_score: 0.0,
            metadata_score: 0.0,
            embedding_score: 0.0,
            issues,
            recommendations,
        };
    }

    let n = qualities.len() as f32;
    let mean = |f: fn(&ChunkQuality) -> f32| qualities.iter().map(f).sum::<f32>() / n;
    let overall = mean(|q| q.score).clamp(0.0, 1.0);
    let content = mean(|q| q.content);
    let structure = mean(|q| q.structure);
    let metadata = mean(|q| q.metadata);
    let embedding = mean(|q| q.embedding);

    let not_ready = chunks.iter().filter(|c| !c.embedding_ready).count();
    if not_ready > 0 {
        issues.push(format!("{not_ready} of {} chunks are not embedding-ready", chunks.len()));
    }
    if discarded > 0 {
        issues.push(format!("{discarded} fragments shorter than {} chars were discarded", options.min_chunk_size));
    }
    if overall < options.min_quality_score {
        issues.push(format!("overall quality {overall:.2} is below {:.2}", options.min_quality_score));
    }
    if content < 0.5 {
        recommendations.push("expand thin passages and vary the vocabulary".to_string());
    }
    if structure < 0.5 {
        recommendations.push("add headings, lists or paragraph breaks".to_string());
    }
    if metadata < 0.5 {
        recommendations.push("supply author, methodology, life area and complexity level".to_string());
    }
    if embedding < 0.5 {
        recommendations.push("remove markup or symbol-heavy passages before ingestion".to_string());
    }

    QualityReport {
        overall_score: overall,
        content_score: content,
        structure_score: structure,
        metadata_score: metadata,
        embedding_score: embedding,
        issues,
        recommendations,
    }
}
