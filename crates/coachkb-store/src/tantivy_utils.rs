//! Schema, tokenizer and key helpers for the lexical index.

use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING};
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, StopWordFilter, TextAnalyzer};
use tantivy::Index;

pub const TEXT_TOKENIZER: &str = "text_with_stopwords";

/// Separates the domain from the id inside composite key fields.
pub const KEY_SEPARATOR: char = '\u{1f}';

#[derive(Debug, Clone, Copy)]
pub struct ChunkFields {
	/// `{domain}\u{1f}{chunk_id}`, unique per stored chunk.
	pub key: Field,
	/// `{domain}\u{1f}{document_id}`, used for cascading deletes.
	pub doc_key: Field,
	pub domain: Field,
	pub category: Field,
	pub text: Field,
}

pub fn build_schema() -> (Schema, ChunkFields) {
	let mut schema_builder = Schema::builder();
	let key = schema_builder.add_text_field("key", STRING | STORED);
	let doc_key = schema_builder.add_text_field("doc_key", STRING);
	let domain = schema_builder.add_text_field("domain", STRING);
	let category = schema_builder.add_text_field("category", STRING);
	let text_field_indexing = TextFieldIndexing::default().set_tokenizer(TEXT_TOKENIZER).set_index_option(IndexRecordOption::WithFreqsAndPositions);
	let text_options = TextOptions::default().set_indexing_options(text_field_indexing);
	let text = schema_builder.add_text_field("text", text_options);
	(schema_builder.build(), ChunkFields { key, doc_key, domain, category, text })
}

pub fn register_tokenizer(index: &Index) {
	let stop_words = vec![
		"a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
	];
	let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(stop_words.into_iter().map(|s| s.to_string())))
		.build();
	index.tokenizers().register(TEXT_TOKENIZER, tokenizer);
}

pub fn compose_key(domain: &str, id: &str) -> String {
	format!("{domain}{KEY_SEPARATOR}{id}")
}

pub fn split_key(key: &str) -> Option<(&str, &str)> {
	key.split_once(KEY_SEPARATOR)
}
