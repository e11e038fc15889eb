use serde::{Deserialize, Serialize};

pub type DocumentId = String;
pub type TermId = u32;

/// One term's occurrence record in one document. `term_frequency` is always > 0;
/// documents that do not contain the term have no posting at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub document_id: DocumentId,
    pub term_frequency: u32,
}

impl Posting {
    pub fn new(document_id: impl Into<DocumentId>, term_frequency: u32) -> Self {
        Self { document_id: document_id.into(), term_frequency }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocMeta {
    pub title: String,
    pub url: Option<String>,
    /// Number of indexed tokens in the document.
    pub length: u64,
    /// Relative path to the stored full text for snippet extraction, e.g., texts/{doc}.txt
    pub text_path: Option<String>,
}

/// Corpus-wide statistics read once per query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorpusStats {
    pub total_documents: u64,
    pub average_document_length: f64,
}

impl CorpusStats {
    /// Scoring needs at least one document and a positive average length.
    pub fn is_empty(&self) -> bool {
        self.total_documents == 0 || !(self.average_document_length > 0.0)
    }
}
