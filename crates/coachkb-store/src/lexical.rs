//! Tantivy RAM index answering ranked full-text matches.

use anyhow::{anyhow, Result};
use parking_lot::Mutex;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, ConstScoreQuery, Occur, Query, QueryParser, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

use coachkb_core::traits::StoreFilter;

use crate::tantivy_utils::{build_schema, compose_key, register_tokenizer, split_key, ChunkFields};

const WRITER_MEMORY_BYTES: usize = 20_000_000;

/// A lexical hit: domain, chunk id and the raw BM25 score.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalHit {
    pub domain: String,
    pub chunk_id: String,
    pub score: f32,
}

pub struct LexicalIndex {
    index: Index,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    fields: ChunkFields,
}

impl LexicalIndex {
    pub fn in_memory() -> Result<Self> {
        let (schema, fields) = build_schema();
        let index = Index::create_in_ram(schema);
        register_tokenizer(&index);
        let writer: IndexWriter = index.writer_with_num_threads(1, WRITER_MEMORY_BYTES)?;
        let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
        Ok(Self { index, reader, writer: Mutex::new(writer), fields })
    }

    /// Insert or replace one chunk's text.
    pub fn upsert(&self, domain: &str, document_id: &str, chunk_id: &str, category: &str, text: &str) -> Result<()> {
        let key = compose_key(domain, chunk_id);
        let mut writer = self.writer.lock();
        writer.delete_term(Term::from_field_text(self.fields.key, &key));
        writer.add_document(doc!(
            self.fields.key => key,
            self.fields.doc_key => compose_key(domain, document_id),
            self.fields.domain => domain,
            self.fields.category => category,
            self.fields.text => text,
        ))?;
        writer.commit()?;
        drop(writer);
        self.reader.reload()?;
        Ok(())
    }

    pub fn delete_document(&self, domain: &str, document_id: &str) -> Result<()> {
        self.delete_term(Term::from_field_text(self.fields.doc_key, &compose_key(domain, document_id)))
    }

    pub fn delete_domain(&self, domain: &str) -> Result<()> {
        self.delete_term(Term::from_field_text(self.fields.domain, domain))
    }

    fn delete_term(&self, term: Term) -> Result<()> {
        let mut writer = self.writer.lock();
        writer.delete_term(term);
        writer.commit()?;
        drop(writer);
        self.reader.reload()?;
        Ok(())
    }

    /// Best-first BM25 hits for `query`, restricted by `filter`.
    ///
    /// Query syntax errors are tolerated: unparsable fragments are ignored.
    pub fn search(&self, query: &str, limit: usize, filter: &StoreFilter) -> Result<Vec<LexicalHit>> {
        if limit == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let parser = QueryParser::for_index(&self.index, vec![self.fields.text]);
        let (text_query, _ignored) = parser.parse_query_lenient(query);

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Must, text_query)];
        if let Some(domain) = &filter.domain {
            clauses.push((Occur::Must, self.exact(self.fields.domain, domain)));
        }
        if let Some(category) = &filter.category {
            clauses.push((Occur::Must, self.exact(self.fields.category, category)));
        }
        let query = BooleanQuery::new(clauses);

        let searcher = self.reader.searcher();
        // TopDocs preallocates `limit` slots.
        let limit = usize::try_from(searcher.num_docs()).map_or(limit, |n| limit.min(n));
        if limit == 0 {
            return Ok(Vec::new());
        }
        let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;
        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            let key = doc
                .get_first(self.fields.key)
                .and_then(|v| v.as_str())
                .ok_or_else(|| anyhow!("indexed chunk without key"))?;
            let (domain, chunk_id) = split_key(key).ok_or_else(|| anyhow!("malformed key '{key}'"))?;
            hits.push(LexicalHit { domain: domain.to_string(), chunk_id: chunk_id.to_string(), score });
        }
        Ok(hits)
    }

    /// Exact-term filter that contributes nothing to the score.
    fn exact(&self, field: tantivy::schema::Field, value: &str) -> Box<dyn Query> {
        let term = TermQuery::new(Term::from_field_text(field, value), IndexRecordOption::Basic);
        Box::new(ConstScoreQuery::new(Box::new(term), 0.0))
    }
}
