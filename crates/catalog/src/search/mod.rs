//! Full-text search over store names and descriptions using Tantivy.
//!
//! The index lives in RAM and holds one document per store. It is rebuilt
//! from the repository when a [`crate::Catalog`] opens and kept current by
//! the write paths, which upsert the store's document after every create or
//! update.
//!
//! Queries are analysed with the same English stop word list and stemmer as
//! the documents, and every resulting term is OR-ed across both fields, so a
//! store matches if any query word (after stemming) appears in its name or
//! description.
//! Results are ranked by BM25 score.

mod indexer;

use std::sync::{Arc, Mutex};

use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{
    FAST, Field, INDEXED, IndexRecordOption, STORED, Schema, TextFieldIndexing, TextOptions, Value,
};
use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, StopWordFilter,
    TextAnalyzer, TokenStream,
};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, Term};
use tracing::{debug, instrument};

use storefinder_core::StoreId;

use crate::models::Store;

pub use indexer::rebuild_from_repository;

const ANALYZER: &str = "en_stem";
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// A matching store and its relevance score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub store: StoreId,
    pub score: f32,
}

/// Schema field handles for the search index.
#[derive(Debug, Clone, Copy)]
struct SearchFields {
    id: Field,
    name_text: Field,
    description_text: Field,
}

struct Inner {
    index: Index,
    reader: IndexReader,
    writer: Mutex<IndexWriter>,
    fields: SearchFields,
}

/// The store search index. Cheap to clone; clones share the index.
#[derive(Clone)]
pub struct SearchIndex {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchIndex")
            .field("num_docs", &self.num_docs())
            .finish_non_exhaustive()
    }
}

impl SearchIndex {
    /// Create an empty in-memory index.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Build` if the writer or reader cannot be created.
    pub fn new() -> Result<Self, SearchError> {
        let (schema, fields) = Self::build_schema();
        let index = Index::create_in_ram(schema);

        let stop_words = StopWordFilter::new(Language::English)
            .ok_or_else(|| SearchError::Build("No English stop word list".to_owned()))?;
        index.tokenizers().register(
            ANALYZER,
            TextAnalyzer::builder(SimpleTokenizer::default())
                .filter(RemoveLongFilter::limit(40))
                .filter(LowerCaser)
                .filter(stop_words)
                .filter(Stemmer::new(Language::English))
                .build(),
        );

        let writer = index
            .writer_with_num_threads(1, WRITER_HEAP_BYTES)
            .map_err(|e| SearchError::Build(format!("Failed to create writer: {e}")))?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| SearchError::Build(format!("Failed to create reader: {e}")))?;

        Ok(Self {
            inner: Arc::new(Inner {
                index,
                reader,
                writer: Mutex::new(writer),
                fields,
            }),
        })
    }

    fn build_schema() -> (Schema, SearchFields) {
        let mut schema_builder = Schema::builder();

        let id = schema_builder.add_i64_field("id", INDEXED | STORED | FAST);

        let text_indexing = TextFieldIndexing::default()
            .set_tokenizer(ANALYZER)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions);
        let text_options = TextOptions::default().set_indexing_options(text_indexing);

        let name_text = schema_builder.add_text_field("name_text", text_options.clone());
        let description_text = schema_builder.add_text_field("description_text", text_options);

        let fields = SearchFields {
            id,
            name_text,
            description_text,
        };
        (schema_builder.build(), fields)
    }

    /// Number of indexed stores.
    #[must_use]
    pub fn num_docs(&self) -> u64 {
        self.inner.reader.searcher().num_docs()
    }

    /// Replace the whole index with `stores`. Returns how many were indexed.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Index` if the commit fails.
    #[instrument(skip_all, fields(stores = stores.len()))]
    pub fn rebuild(&self, stores: &[Store]) -> Result<usize, SearchError> {
        let mut writer = self.lock_writer()?;
        writer
            .delete_all_documents()
            .map_err(|e| SearchError::Index(format!("Failed to clear index: {e}")))?;

        for store in stores {
            writer
                .add_document(self.document(store))
                .map_err(|e| SearchError::Index(format!("Failed to add store {}: {e}", store.id)))?;
        }

        self.commit(&mut writer)?;
        Ok(stores.len())
    }

    /// Insert or replace the document for one store.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Index` if the commit fails.
    #[instrument(skip_all, fields(store = %store.id))]
    pub fn upsert(&self, store: &Store) -> Result<(), SearchError> {
        let mut writer = self.lock_writer()?;
        writer.delete_term(self.id_term(store.id));
        writer
            .add_document(self.document(store))
            .map_err(|e| SearchError::Index(format!("Failed to add store {}: {e}", store.id)))?;
        self.commit(&mut writer)
    }

    /// Top `limit` stores matching any word of `query`, best first.
    ///
    /// A query with no searchable words matches nothing.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Query` if the search or document fetch fails.
    #[instrument(skip(self))]
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        let fields = self.inner.fields;
        let terms = self.analyze(fields.name_text, query)?;
        if terms.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::with_capacity(terms.len() * 2);
        for term in &terms {
            for field in [fields.name_text, fields.description_text] {
                clauses.push((
                    Occur::Should,
                    Box::new(TermQuery::new(
                        Term::from_field_text(field, term),
                        IndexRecordOption::WithFreqs,
                    )),
                ));
            }
        }
        let query = BooleanQuery::new(clauses);

        let searcher = self.inner.reader.searcher();
        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(limit))
            .map_err(|e| SearchError::Query(format!("Search failed: {e}")))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let doc = searcher
                .doc::<tantivy::TantivyDocument>(doc_address)
                .map_err(|e| SearchError::Query(format!("Failed to retrieve doc: {e}")))?;
            let id = doc
                .get_first(fields.id)
                .and_then(|v| v.as_i64())
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| SearchError::Query("Indexed doc has no store id".to_string()))?;
            hits.push(SearchHit {
                store: StoreId::new(id),
                score,
            });
        }

        debug!(terms = terms.len(), hits = hits.len(), "Text search complete");
        Ok(hits)
    }

    fn document(&self, store: &Store) -> tantivy::TantivyDocument {
        let fields = self.inner.fields;
        tantivy::doc!(
            fields.id => i64::from(store.id.as_i32()),
            fields.name_text => store.name.clone(),
            fields.description_text => store.description.clone()
        )
    }

    fn id_term(&self, id: StoreId) -> Term {
        Term::from_field_i64(self.inner.fields.id, i64::from(id.as_i32()))
    }

    /// Run `text` through the field's analyzer.
    fn analyze(&self, field: Field, text: &str) -> Result<Vec<String>, SearchError> {
        let mut analyzer = self
            .inner
            .index
            .tokenizer_for_field(field)
            .map_err(|e| SearchError::Query(format!("Missing analyzer: {e}")))?;

        let mut terms: Vec<String> = Vec::new();
        let mut stream = analyzer.token_stream(text);
        while stream.advance() {
            let token = stream.token().text.clone();
            if !terms.contains(&token) {
                terms.push(token);
            }
        }
        Ok(terms)
    }

    fn lock_writer(&self) -> Result<std::sync::MutexGuard<'_, IndexWriter>, SearchError> {
        self.inner
            .writer
            .lock()
            .map_err(|_| SearchError::Index("Lock poisoned".to_string()))
    }

    fn commit(&self, writer: &mut IndexWriter) -> Result<(), SearchError> {
        writer
            .commit()
            .map_err(|e| SearchError::Index(format!("Failed to commit index: {e}")))?;
        self.inner
            .reader
            .reload()
            .map_err(|e| SearchError::Index(format!("Failed to reload reader: {e}")))
    }
}

/// Search errors.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Index error: {0}")]
    Index(String),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Build error: {0}")]
    Build(String),
}
