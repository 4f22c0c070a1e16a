//! coachkb-store
//!
//! Reference [`coachkb_core::traits::KnowledgeStore`]: an in-process,
//! domain-scoped store backed by a brute-force cosine table and a tantivy RAM
//! index. Used by tests and embedded deployments; production deployments plug
//! in their own store behind the same trait.

pub mod lexical;
pub mod memory;
pub mod tantivy_utils;

pub use lexical::{LexicalHit, LexicalIndex};
pub use memory::{cosine_similarity, MemoryStore};
