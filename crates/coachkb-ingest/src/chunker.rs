//! Sliding-window chunking with soft splitters.
//!
//! Lengths and offsets are in characters, not bytes.

use coachkb_core::config::ProcessingOptions;

/// Split boundaries in order of preference.
pub const SPLITTERS: [&str; 5] = ["\n\n", "\n", ". ", "! ", "? "];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk {
    pub content: String,
    /// Char offset of the window start in the preprocessed text.
    pub start: usize,
    /// Char offset one past the window end.
    pub end: usize,
}

#[derive(Debug, Default)]
pub struct ChunkOutcome {
    pub chunks: Vec<RawChunk>,
    /// Windows dropped for being shorter than `min_chunk_size` after trimming.
    pub discarded: Vec<RawChunk>,
}

/// Cut `text` into overlapping windows of at most `chunk_size` chars.
///
/// A text shorter than `min_chunk_size` yields exactly one chunk.
pub fn split_text(text: &str, options: &ProcessingOptions) -> ChunkOutcome {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let mut outcome = ChunkOutcome::default();
    if text.trim().is_empty() {
        return outcome;
    }
    if total < options.min_chunk_size {
        outcome.chunks.push(piece(&chars, 0, total));
        return outcome;
    }

    let chunk_size = options.chunk_size.max(1);
    let mut start = 0;
    loop {
        let end = if total - start <= chunk_size {
            total
        } else {
            start + find_split(&chars[start..start + chunk_size])
        };
        let raw = piece(&chars, start, end);
        if raw.content.chars().count() >= options.min_chunk_size {
            outcome.chunks.push(raw);
        } else if !raw.content.is_empty() {
            outcome.discarded.push(raw);
        }
        if end >= total {
            break;
        }
        let next = end.saturating_sub(options.chunk_overlap);
        start = if next > start { next } else { end };
    }
    outcome
}

fn piece(chars: &[char], start: usize, end: usize) -> RawChunk {
    let content: String = chars[start..end].iter().collect();
    RawChunk { content: content.trim().to_string(), start, end }
}

/// Split point (exclusive, relative to the window) for a full window.
fn find_split(window: &[char]) -> usize {
    let len = window.len();
    let half = len / 2;
    for splitter in SPLITTERS {
        let pattern: Vec<char> = splitter.chars().collect();
        if let Some(pos) = rfind(window, &pattern) {
            if pos >= half {
                return pos + pattern.len();
            }
        }
    }
    let word_floor = len * 7 / 10;
    match window.iter().rposition(|c| c.is_whitespace()) {
        Some(pos) if pos >= word_floor && pos > 0 => pos + 1,
        _ => len,
    }
}

fn rfind(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).rev().find(|&i| haystack[i..i + needle.len()] == *needle)
}
