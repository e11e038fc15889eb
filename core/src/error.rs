/// Failure conditions surfaced by the ranking pipeline.
///
/// None of these abort a query: the pipeline reports them next to whatever
/// partial result it could still compute.
#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    /// A postings or document store call failed for `subject` (a term or a document id).
    #[error("store unavailable for {subject}: {source}")]
    StoreUnavailable {
        subject: String,
        #[source]
        source: anyhow::Error,
    },

    /// The corpus has no documents, or its average document length is not positive.
    #[error("corpus is empty")]
    EmptyCorpus,

    /// The store reported a document frequency larger than the corpus.
    #[error("malformed corpus stats for {term:?}: document frequency {document_frequency} exceeds {total_documents} documents")]
    MalformedCorpusStats {
        term: String,
        document_frequency: u64,
        total_documents: u64,
    },

    #[error("query timed out after {after_ms} ms")]
    TimedOut { after_ms: u64 },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl SearchError {
    pub fn store_unavailable(subject: impl Into<String>, source: anyhow::Error) -> Self {
        Self::StoreUnavailable { subject: subject.into(), source }
    }
}

pub type Result<T> = core::result::Result<T, SearchError>;
