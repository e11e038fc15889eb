//! BM25 with query-term-frequency saturation.
//!
//! ```text
//! idf(t)      = ln((N - n_t + 0.5) / (n_t + 0.5))
//! tf(t, d)    = ((k1 + 1) * f_td) / (k1 * (1 - b + b * L_d / L_avg) + f_td)
//! qf(t)       = ((k3 + 1) * qw_t) / (k3 + qw_t)
//! score(d, t) = idf(t) * tf(t, d) * qf(t) * scale
//! ```
//!
//! Scores are kept bit-compatible with earlier deployments, including the
//! display scale of 100 and the unshifted idf (which goes negative for terms
//! present in more than half of the corpus).

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::index::CorpusStats;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Scorer {
    pub k1: f64,
    pub b: f64,
    pub k3: f64,
    pub scale: f64,
}

impl Default for Bm25Scorer {
    fn default() -> Self { Self::from_config(&SearchConfig::default()) }
}

/// Inverse document frequency of one term, plus the integrity problem that
/// forced it to zero, if any.
#[derive(Debug)]
pub struct Idf {
    pub value: f64,
    pub malformed: Option<SearchError>,
}

impl Bm25Scorer {
    pub fn from_config(config: &SearchConfig) -> Self {
        Self { k1: config.k1, b: config.b, k3: config.k3, scale: config.score_scale }
    }

    /// A store reporting more containing documents than the corpus holds gets
    /// an idf of 0 rather than a NaN from the logarithm.
    pub fn idf(&self, term: &str, document_frequency: u64, total_documents: u64) -> Idf {
        if document_frequency > total_documents {
            return Idf {
                value: 0.0,
                malformed: Some(SearchError::MalformedCorpusStats {
                    term: term.to_string(),
                    document_frequency,
                    total_documents,
                }),
            };
        }
        let n = total_documents as f64;
        let df = document_frequency as f64;
        let numerator = n - df + 0.5;
        let denominator = df + 0.5;
        let value = if numerator > 0.0 && denominator > 0.0 { (numerator / denominator).ln() } else { 0.0 };
        Idf { value, malformed: None }
    }

    pub fn tf_component(&self, term_frequency: u32, document_length: u64, average_document_length: f64) -> f64 {
        let f = f64::from(term_frequency);
        let norm = 1.0 - self.b + self.b * (document_length as f64 / average_document_length);
        ((self.k1 + 1.0) * f) / (self.k1 * norm + f)
    }

    pub fn qf_component(&self, query_weight: u32) -> f64 {
        let qw = f64::from(query_weight);
        ((self.k3 + 1.0) * qw) / (self.k3 + qw)
    }

    /// Score one (document, term) pair given an already computed idf.
    ///
    /// `stats` must not be empty; the pipeline short-circuits before calling this.
    pub fn score(&self, idf: f64, term_frequency: u32, document_length: u64, stats: &CorpusStats, query_weight: u32) -> f64 {
        let tf = self.tf_component(term_frequency, document_length, stats.average_document_length);
        let qf = self.qf_component(query_weight);
        let score = idf * tf * qf * self.scale;
        if score.is_finite() { score } else { 0.0 }
    }
}
