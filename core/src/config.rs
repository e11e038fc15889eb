use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Tunables for one deployment of the ranking pipeline.
///
/// Every field has a default, so a JSON config only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub k1: f64,
    pub b: f64,
    pub k3: f64,
    /// Display-scale multiplier applied to every BM25 score. Not a probability.
    pub score_scale: f64,
    /// Number of ranked documents kept. `0` keeps all of them.
    pub top_k: usize,
    pub postings_limit: usize,
    pub snippet_width: usize,
    pub snippet_lead: usize,
    /// Per-query deadline. `0` disables it.
    pub query_timeout_ms: u64,
}

fn default_k() -> usize { 10 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            k1: 1.2,
            b: 0.75,
            k3: 100.0,
            score_scale: 100.0,
            top_k: default_k(),
            postings_limit: 21,
            snippet_width: 50,
            snippet_lead: 25,
            query_timeout_ms: 5_000,
        }
    }
}

impl SearchConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: SearchConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(SearchError::InvalidConfig(format!("k1 must be a non-negative number, got {}", self.k1)));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(SearchError::InvalidConfig(format!("b must lie in [0, 1], got {}", self.b)));
        }
        if !self.k3.is_finite() || self.k3 <= 0.0 {
            return Err(SearchError::InvalidConfig(format!("k3 must be positive, got {}", self.k3)));
        }
        if !self.score_scale.is_finite() {
            return Err(SearchError::InvalidConfig("score_scale must be finite".into()));
        }
        if self.snippet_width == 0 {
            return Err(SearchError::InvalidConfig("snippet_width must be at least 1".into()));
        }
        if self.postings_limit == 0 {
            return Err(SearchError::InvalidConfig("postings_limit must be at least 1".into()));
        }
        Ok(())
    }

    pub fn top_k(&self) -> Option<usize> {
        (self.top_k > 0).then_some(self.top_k)
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_ms > 0).then(|| Duration::from_millis(self.query_timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let c = SearchConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.top_k(), Some(10));
        assert_eq!(c.snippet_width, 50);
        assert_eq!(c.snippet_lead, 25);
    }

    #[test]
    fn zero_top_k_disables_truncation() {
        let c = SearchConfig { top_k: 0, ..Default::default() };
        assert_eq!(c.top_k(), None);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(SearchConfig { b: 1.5, ..Default::default() }.validate().is_err());
        assert!(SearchConfig { k3: 0.0, ..Default::default() }.validate().is_err());
        assert!(SearchConfig { snippet_width: 0, ..Default::default() }.validate().is_err());
        assert!(SearchConfig { k1: f64::NAN, ..Default::default() }.validate().is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{ "top_k": 3, "snippet_width": 20 }}"#).unwrap();
        let c = SearchConfig::from_json_file(f.path()).unwrap();
        assert_eq!(c.top_k, 3);
        assert_eq!(c.snippet_width, 20);
        assert_eq!(c.k1, 1.2);
        assert_eq!(c.postings_limit, 21);
    }
}
