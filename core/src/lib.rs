//! Query-time ranking core: BM25 scoring, cross-term aggregation, top-K
//! selection and snippet extraction over an externally maintained index.

pub mod config;
pub mod error;
pub mod index;
pub mod merge;
pub mod persist;
pub mod pipeline;
pub mod query;
pub mod rank;
pub mod scoring;
pub mod snippet;
pub mod store;
pub mod tokenizer;

pub use config::SearchConfig;
pub use error::SearchError;
pub use index::{CorpusStats, DocMeta, DocumentId, Posting};
pub use merge::ScoreMap;
pub use pipeline::{RankOutcome, SearchHit, SearchOutcome, SearchPipeline};
pub use query::{process_query, QueryTerm};
pub use rank::{RankedResult, ScoredDocument};
pub use scoring::Bm25Scorer;
pub use snippet::Snippet;
pub use store::{DocumentStore, MemoryStore, PostingsStore};
pub use tokenizer::{Normalizer, SnowballNormalizer};
