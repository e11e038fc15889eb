use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::index::{CorpusStats, DocumentId};
use crate::merge::{merge_all, ScoreMap};
use crate::query::{process_query, QueryTerm};
use crate::rank::{rank, RankedResult};
use crate::scoring::Bm25Scorer;
use crate::snippet::{Snippet, SnippetExtractor, TermMatcher};
use crate::store::{DocumentStore, PostingsStore};
use crate::tokenizer::Normalizer;
use anyhow::Context;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

/// Ranking plus the conditions met along the way. `failures` lists failed
/// terms, integrity problems and any short-circuit reason; `ranked` holds
/// whatever could still be computed.
#[derive(Debug, Default)]
pub struct RankOutcome {
    pub ranked: RankedResult,
    pub failures: Vec<SearchError>,
}

impl RankOutcome {
    fn failed(error: SearchError) -> Self {
        Self { ranked: RankedResult::empty(), failures: vec![error] }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub document_id: DocumentId,
    pub score: f64,
    pub snippet: Option<Snippet>,
}

#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub hits: Vec<SearchHit>,
    pub total_hits: usize,
    pub failures: Vec<SearchError>,
}

/// Per-query ranking over injected store handles. Holds no per-query state,
/// so one pipeline can serve concurrent queries.
#[derive(Clone)]
pub struct SearchPipeline {
    postings: Arc<dyn PostingsStore>,
    documents: Arc<dyn DocumentStore>,
    config: SearchConfig,
    scorer: Bm25Scorer,
}

struct TermScores {
    term: String,
    scores: ScoreMap,
    malformed: Option<SearchError>,
}

async fn run_blocking<T, F>(f: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

async fn until<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(at) => timeout_at(at, fut).await.ok(),
        None => Some(fut.await),
    }
}

fn score_term(store: &dyn PostingsStore, scorer: &Bm25Scorer, stats: &CorpusStats, query_term: &QueryTerm, limit: usize) -> Result<TermScores> {
    let term = query_term.term.as_str();
    let unavailable = |e| SearchError::store_unavailable(term, e);

    let document_frequency = store.document_frequency(term).map_err(unavailable)?;
    let idf = scorer.idf(term, document_frequency, stats.total_documents);
    let postings = store.postings(term, 0, limit).map_err(unavailable)?;

    let mut scores = ScoreMap::new();
    for posting in postings {
        let length = store
            .document_length(&posting.document_id)
            .with_context(|| format!("length of document {}", posting.document_id))
            .map_err(unavailable)?;
        let score = scorer.score(idf.value, posting.term_frequency, length, stats, query_term.weight);
        scores.add(posting.document_id, score);
    }
    debug!(term, document_frequency, matched = scores.len(), "term scored");
    Ok(TermScores { term: term.to_string(), scores, malformed: idf.malformed })
}

impl SearchPipeline {
    pub fn new(postings: Arc<dyn PostingsStore>, documents: Arc<dyn DocumentStore>, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let scorer = Bm25Scorer::from_config(&config);
        Ok(Self { postings, documents, config, scorer })
    }

    /// Both roles served by one store, as with [`crate::MemoryStore`] or [`crate::persist::DiskStore`].
    pub fn with_store<S>(store: Arc<S>, config: SearchConfig) -> Result<Self>
    where
        S: PostingsStore + DocumentStore + 'static,
    {
        let documents: Arc<dyn DocumentStore> = store.clone();
        Self::new(store, documents, config)
    }

    pub fn config(&self) -> &SearchConfig { &self.config }

    fn deadline(&self) -> Option<Instant> {
        self.config.query_timeout().map(|d| Instant::now() + d)
    }

    fn timed_out(&self) -> SearchError {
        SearchError::TimedOut { after_ms: self.config.query_timeout_ms }
    }

    fn extractor(&self) -> SnippetExtractor {
        SnippetExtractor::new(self.config.snippet_width, self.config.snippet_lead)
    }

    /// Score every query term against its postings and rank the summed scores.
    pub async fn rank(&self, query: &[QueryTerm]) -> RankOutcome {
        self.rank_until(query, self.config.top_k(), self.deadline()).await
    }

    async fn rank_until(&self, query: &[QueryTerm], top_k: Option<usize>, deadline: Option<Instant>) -> RankOutcome {
        if query.is_empty() {
            return RankOutcome::default();
        }
        match until(deadline, self.rank_terms(query, top_k)).await {
            Some(outcome) => outcome,
            None => {
                // in-flight per-term maps are dropped with the future
                warn!(timeout_ms = self.config.query_timeout_ms, "ranking timed out");
                RankOutcome::failed(self.timed_out())
            }
        }
    }

    async fn rank_terms(&self, query: &[QueryTerm], top_k: Option<usize>) -> RankOutcome {
        let store = Arc::clone(&self.postings);
        let stats = match run_blocking(move || store.corpus_stats()).await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "corpus stats unavailable");
                return RankOutcome::failed(SearchError::store_unavailable("corpus stats", e));
            }
        };
        if stats.is_empty() {
            debug!(?stats, "empty corpus");
            return RankOutcome::failed(SearchError::EmptyCorpus);
        }

        let mut tasks = JoinSet::new();
        for query_term in query.iter().cloned() {
            let store = Arc::clone(&self.postings);
            let scorer = self.scorer;
            let limit = self.config.postings_limit;
            tasks.spawn_blocking(move || score_term(store.as_ref(), &scorer, &stats, &query_term, limit));
        }

        let mut per_term = Vec::with_capacity(query.len());
        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(scores)) => per_term.push(scores),
                Ok(Err(e)) => {
                    warn!(error = %e, "query term dropped");
                    failures.push(e);
                }
                Err(e) => failures.push(SearchError::store_unavailable("postings task", e.into())),
            }
        }

        // fixed fold order keeps float sums independent of task completion order
        per_term.sort_by(|a, b| a.term.cmp(&b.term));
        for t in per_term.iter_mut() {
            if let Some(malformed) = t.malformed.take() {
                warn!(error = %malformed, "corpus integrity");
                failures.push(malformed);
            }
        }
        let aggregate = merge_all(per_term.into_iter().map(|t| t.scores));
        let ranked = rank(aggregate, top_k);
        failures.sort_by_key(|e| e.to_string());
        debug!(hits = ranked.total_hits, kept = ranked.len(), failures = failures.len(), "ranked");
        RankOutcome { ranked, failures }
    }

    /// Excerpt of one document concentrated around the query terms.
    pub async fn snippet(&self, document_id: &str, query: &[QueryTerm]) -> Result<Snippet> {
        let store = Arc::clone(&self.documents);
        let extractor = self.extractor();
        let matcher = TermMatcher::from_query(query);
        let id = document_id.to_string();
        run_blocking(move || {
            let tokens = store.tokens(&id)?;
            Ok(Snippet { document_id: id, text: extractor.extract(&tokens, &matcher) })
        })
        .await
        .map_err(|e| SearchError::store_unavailable(document_id, e))
    }

    /// Rank, then extract snippets for the documents that survived truncation.
    pub async fn search(&self, query: &[QueryTerm]) -> SearchOutcome {
        self.search_page(query, 0, self.config.top_k()).await
    }

    /// Like [`Self::search`] for the `limit` ranked documents after the first
    /// `offset`. Snippets are only extracted for the returned page.
    pub async fn search_page(&self, query: &[QueryTerm], offset: usize, limit: Option<usize>) -> SearchOutcome {
        let deadline = self.deadline();
        let keep = limit.map(|l| offset.saturating_add(l));
        let RankOutcome { ranked, mut failures } = self.rank_until(query, keep, deadline).await;
        let total_hits = ranked.total_hits;
        let mut hits: Vec<SearchHit> = ranked
            .page(offset, limit.unwrap_or(usize::MAX))
            .iter()
            .map(|d| SearchHit { document_id: d.document_id.clone(), score: d.score, snippet: None })
            .collect();
        if hits.is_empty() {
            return SearchOutcome { hits, total_hits, failures };
        }

        let matcher = Arc::new(TermMatcher::from_query(query));
        let extractor = self.extractor();
        let mut tasks = JoinSet::new();
        for (i, hit) in hits.iter().enumerate() {
            let store = Arc::clone(&self.documents);
            let matcher = Arc::clone(&matcher);
            let id = hit.document_id.clone();
            tasks.spawn_blocking(move || {
                let snippet = store
                    .tokens(&id)
                    .map(|tokens| Snippet { text: extractor.extract(&tokens, &matcher), document_id: id.clone() })
                    .map_err(|e| SearchError::store_unavailable(id, e));
                (i, snippet)
            });
        }

        let mut snippet_failures = Vec::new();
        let collect = async {
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((i, Ok(snippet))) => hits[i].snippet = Some(snippet),
                    Ok((_, Err(e))) => {
                        warn!(error = %e, "snippet unavailable");
                        snippet_failures.push(e);
                    }
                    Err(e) => snippet_failures.push(SearchError::store_unavailable("snippet task", e.into())),
                }
            }
        };
        if until(deadline, collect).await.is_none() {
            warn!(timeout_ms = self.config.query_timeout_ms, "snippet extraction timed out");
            snippet_failures.push(self.timed_out());
        }
        snippet_failures.sort_by_key(|e| e.to_string());
        failures.extend(snippet_failures);
        SearchOutcome { hits, total_hits, failures }
    }

    /// Normalize a raw query string and run [`Self::search`] on it.
    pub async fn search_raw(&self, normalizer: &dyn Normalizer, raw: &str) -> SearchOutcome {
        let query = process_query(normalizer.normalize(raw));
        self.search(&query).await
    }
}
