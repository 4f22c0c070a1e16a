//! Deterministic feature-hashing embedder.
//!
//! Each lower-cased token is hashed with XxHash64 into one of `dim` buckets;
//! the vector is then L2-normalized. No model weights, so it is fast and
//! reproducible in tests and development. Texts sharing vocabulary land close
//! together under cosine similarity.

use async_trait::async_trait;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use coachkb_core::traits::EmbeddingProvider;

pub struct HashEmbedder {
    dim: usize,
    id: String,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim, id: format!("hash:xxh64:d{dim}") }
    }

    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        if self.dim == 0 {
            return v;
        }
        for (i, token) in text.split_whitespace().enumerate() {
            let token = token.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            if token.is_empty() {
                continue;
            }
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += 0.5 + val * 0.5 + (i as f32 % 3.0) * 0.01;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 1e-6 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn model_id(&self) -> &str {
        &self.id
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn shapes_norm_and_determinism() {
        let embedder = HashEmbedder::new(384);
        let v1 = embedder.embed_sync("hello world");
        let v2 = embedder.embed_sync("hello world");
        assert_eq!(v1.len(), 384);
        let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");
        for (a, b) in v1.iter().zip(v2.iter()) {
            assert!((a - b).abs() <= 1e-6);
        }
    }

    #[test]
    fn shared_vocabulary_scores_higher() {
        let embedder = HashEmbedder::new(384);
        let q = embedder.embed_sync("goal setting habits");
        let near = embedder.embed_sync("Goal setting builds lasting habits.");
        let far = embedder.embed_sync("quarterly revenue forecast spreadsheet");
        assert!(cosine(&q, &near) > cosine(&q, &far));
    }

    #[test]
    fn blank_text_is_zero_vector() {
        let embedder = HashEmbedder::new(8);
        assert!(embedder.embed_sync("   ").iter().all(|x| *x == 0.0));
    }
}
