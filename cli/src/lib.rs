use anyhow::Result;
use search_core::persist::DiskStore;
use search_core::{DocumentStore, SearchConfig, SearchPipeline, SnowballNormalizer, Normalizer, process_query};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_ms: u128,
    pub took_s: f64,
    pub total_hits: usize,
    pub offset: usize,
    pub results: Vec<ResultEntry>,
    pub failures: Vec<String>,
}

#[derive(Serialize)]
pub struct ResultEntry {
    pub document_id: String,
    pub score: f64,
    pub title: Option<String>,
    pub url: Option<String>,
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryOptions {
    pub offset: usize,
    pub highlight: bool,
}

/// Query front-end over one index directory.
pub struct App {
    pipeline: SearchPipeline,
    documents: Arc<DiskStore>,
    normalizer: SnowballNormalizer,
}

pub fn open_index<P: AsRef<Path>>(index_dir: P, config: SearchConfig) -> Result<App> {
    let store = Arc::new(DiskStore::open(index_dir)?);
    let pipeline = SearchPipeline::with_store(Arc::clone(&store), config)?;
    Ok(App { pipeline, documents: store, normalizer: SnowballNormalizer })
}

impl App {
    pub fn config(&self) -> &SearchConfig { self.pipeline.config() }

    pub async fn query(&self, raw: &str, options: QueryOptions) -> SearchResponse {
        let start = std::time::Instant::now();
        let terms = self.normalizer.normalize(raw);
        let query = process_query(&terms);
        let outcome = self.pipeline.search_page(&query, options.offset, self.config().top_k()).await;

        let mut failures: Vec<String> = outcome.failures.iter().map(|e| e.to_string()).collect();
        let mut results = Vec::with_capacity(outcome.hits.len());
        for hit in outcome.hits {
            // rendering metadata is best effort; a missing title does not drop the hit
            let title = self.documents.title(&hit.document_id).unwrap_or_else(|e| {
                failures.push(format!("title for {}: {e}", hit.document_id));
                None
            });
            let url = self.documents.url(&hit.document_id).unwrap_or(None);
            let snippet = hit.snippet.map(|s| if options.highlight { highlight_terms(&s.text, &terms) } else { s.text });
            results.push(ResultEntry { document_id: hit.document_id, score: hit.score, title, url, snippet });
        }

        let elapsed = start.elapsed();
        tracing::info!(query = raw, hits = outcome.total_hits, took_ms = elapsed.as_millis() as u64, "query served");
        SearchResponse {
            query: raw.to_string(),
            took_ms: elapsed.as_millis(),
            took_s: elapsed.as_secs_f64(),
            total_hits: outcome.total_hits,
            offset: options.offset,
            results,
            failures,
        }
    }
}

/// Wrap case-insensitive occurrences of the query terms in `<em>`.
pub fn highlight_terms(snippet: &str, terms: &[String]) -> String {
    let alternatives: Vec<String> = terms.iter().filter(|t| !t.trim().is_empty()).map(|t| regex::escape(t)).collect();
    if alternatives.is_empty() {
        return snippet.to_string();
    }
    match regex::RegexBuilder::new(&alternatives.join("|")).case_insensitive(true).build() {
        Ok(pat) => pat.replace_all(snippet, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).into_owned(),
        Err(e) => {
            tracing::warn!(error = %e, "highlight pattern rejected");
            snippet.to_string()
        }
    }
}
