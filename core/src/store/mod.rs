//! Collaborator seams: where postings, corpus statistics and document text come from.
//!
//! Implementations return `anyhow::Result`; the pipeline turns any failure
//! into `SearchError::StoreUnavailable` for the term or document involved.
//! Retrying, if wanted, belongs in the implementation.

mod memory;

pub use memory::MemoryStore;

use crate::index::{CorpusStats, Posting};
use anyhow::Result;

pub trait PostingsStore: Send + Sync {
    /// Postings for `term` in the store's relevance-proxy order, skipping
    /// `offset` entries and returning at most `limit`.
    fn postings(&self, term: &str, offset: usize, limit: usize) -> Result<Vec<Posting>>;

    /// Number of documents containing `term` at least once.
    fn document_frequency(&self, term: &str) -> Result<u64>;

    fn total_documents(&self) -> Result<u64>;

    fn document_length(&self, document_id: &str) -> Result<u64>;

    fn average_document_length(&self) -> Result<f64>;

    fn corpus_stats(&self) -> Result<CorpusStats> {
        Ok(CorpusStats {
            total_documents: self.total_documents()?,
            average_document_length: self.average_document_length()?,
        })
    }
}

pub trait DocumentStore: Send + Sync {
    /// The document's words in order, as used for snippet extraction.
    fn tokens(&self, document_id: &str) -> Result<Vec<String>>;

    fn title(&self, document_id: &str) -> Result<Option<String>>;

    fn url(&self, document_id: &str) -> Result<Option<String>>;
}
