use std::collections::BTreeSet;

use chrono::Utc;
use coachkb_core::traits::{KnowledgeStore, StoreFilter};
use coachkb_core::types::{Chunk, ChunkMetadata, ChunkType};
use coachkb_store::MemoryStore;

fn chunk(doc: &str, index: usize, category: &str, content: &str) -> Chunk {
    Chunk {
        id: Chunk::make_id(doc, index),
        content: content.to_string(),
        index,
        metadata: ChunkMetadata {
            source_document_id: doc.to_string(),
            title: format!("Title of {doc}"),
            category: category.to_string(),
            author: Some("A. Coach".to_string()),
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

#[tokio::test]
async fn nearest_neighbors_respects_threshold_limit_and_scope() -> anyhow::Result<()> {
    let store = MemoryStore::new()?;
    store.persist_chunk("life", &chunk("d1", 0, "habits", "a"), Some(&[1.0, 0.0])).await?;
    store.persist_chunk("life", &chunk("d1", 1, "habits", "b"), Some(&[0.8, 0.6])).await?;
    store.persist_chunk("life", &chunk("d2", 0, "career", "c"), Some(&[0.0, 1.0])).await?;
    store.persist_chunk("career", &chunk("d3", 0, "habits", "d"), Some(&[1.0, 0.0])).await?;
    store.persist_chunk("life", &chunk("d4", 0, "habits", "no vector"), None).await?;

    let rows = store.nearest_neighbors(&[1.0, 0.0], 0.5, 10, &StoreFilter::for_domain("life")).await?;
    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["d1_chunk_0", "d1_chunk_1"]);
    assert!((rows[0].similarity - 1.0).abs() < 1e-5);
    assert!((rows[1].similarity - 0.8).abs() < 1e-5);
    assert_eq!(rows[0].document_title, "Title of d1");

    let limited = store.nearest_neighbors(&[1.0, 0.0], 0.0, 1, &StoreFilter::for_domain("life")).await?;
    assert_eq!(limited.len(), 1);

    let by_category = store
        .nearest_neighbors(&[0.0, 1.0], 0.1, 10, &StoreFilter::for_domain("life").with_category(Some("career".into())))
        .await?;
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].id, "d2_chunk_0");
    Ok(())
}

#[tokio::test]
async fn lexical_match_normalizes_scores() -> anyhow::Result<()> {
    let store = MemoryStore::new()?;
    store.persist_chunk("life", &chunk("d1", 0, "c", "resilience resilience resilience training"), None).await?;
    store.persist_chunk("life", &chunk("d2", 0, "c", "a note on resilience among many other words here"), None).await?;

    let rows = store.lexical_match("resilience", 10, &StoreFilter::for_domain("life")).await?;
    assert_eq!(rows.len(), 2);
    assert!((rows[0].similarity - 1.0).abs() < 1e-6, "top hit is normalized to 1");
    assert!(rows[1].similarity > 0.0 && rows[1].similarity <= 1.0);
    Ok(())
}

#[tokio::test]
async fn lexical_match_accepts_limits_beyond_index_size() -> anyhow::Result<()> {
    let store = MemoryStore::new()?;
    let rows = store.lexical_match("resilience", usize::MAX / 2, &StoreFilter::default()).await?;
    assert!(rows.is_empty());

    store.persist_chunk("life", &chunk("d1", 0, "c", "resilience after setbacks"), None).await?;
    let rows = store.lexical_match("resilience", usize::MAX / 2, &StoreFilter::for_domain("life")).await?;
    assert_eq!(rows.len(), 1);
    Ok(())
}

#[tokio::test]
async fn deletes_cascade_to_both_indexes() -> anyhow::Result<()> {
    let store = MemoryStore::new()?;
    store.persist_chunk("life", &chunk("d1", 0, "c", "boundaries at work"), Some(&[1.0, 0.0])).await?;
    store.persist_chunk("life", &chunk("d1", 1, "c", "boundaries at home"), Some(&[1.0, 0.0])).await?;
    store.persist_chunk("life", &chunk("d2", 0, "c", "boundaries with family"), Some(&[1.0, 0.0])).await?;
    store.persist_chunk("career", &chunk("d1", 0, "c", "boundaries with clients"), Some(&[1.0, 0.0])).await?;
    assert!(store.has_embedding("life", "d1_chunk_0"));

    assert_eq!(store.delete_document("life", "d1").await?, 2);
    assert_eq!(store.count_in_domain("career"), 1, "same document id in another domain is untouched");
    let rows = store.lexical_match("boundaries", 10, &StoreFilter::for_domain("life")).await?;
    assert_eq!(rows.len(), 1);

    assert_eq!(store.delete_domain("life").await?, 1);
    assert!(store.lexical_match("boundaries", 10, &StoreFilter::for_domain("life")).await?.is_empty());
    assert_eq!(store.len(), 1);
    Ok(())
}
