use crate::index::DocumentId;
use crate::merge::ScoreMap;
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    pub document_id: DocumentId,
    pub score: f64,
}

/// Documents in descending score order, ties broken by ascending document id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RankedResult {
    pub documents: Vec<ScoredDocument>,
    /// How many documents matched before truncation.
    pub total_hits: usize,
}

impl RankedResult {
    pub fn empty() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.documents.len() }

    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    pub fn document_ids(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|d| d.document_id.as_str())
    }

    /// Slice of the ranking starting at `offset`.
    pub fn page(&self, offset: usize, limit: usize) -> &[ScoredDocument] {
        let start = offset.min(self.documents.len());
        let end = start.saturating_add(limit).min(self.documents.len());
        &self.documents[start..end]
    }
}

fn compare(a: &ScoredDocument, b: &ScoredDocument) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.document_id.cmp(&b.document_id))
}

/// Full sort of the aggregate, then truncation to `top_k` if given.
pub fn rank(scores: ScoreMap, top_k: Option<usize>) -> RankedResult {
    let mut documents: Vec<ScoredDocument> = scores
        .into_iter()
        .map(|(document_id, score)| ScoredDocument { document_id, score })
        .collect();
    documents.sort_by(compare);
    let total_hits = documents.len();
    if let Some(k) = top_k {
        documents.truncate(k);
    }
    RankedResult { documents, total_hits }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scores(entries: &[(&str, f64)]) -> ScoreMap {
        entries.iter().map(|(id, s)| (id.to_string(), *s)).collect()
    }

    #[test]
    fn sorts_descending() {
        let r = rank(scores(&[("a", 1.0), ("b", 3.0), ("c", 2.0)]), None);
        assert_eq!(r.document_ids().collect::<Vec<_>>(), vec!["b", "c", "a"]);
    }

    #[test]
    fn equal_scores_break_ties_by_id() {
        let r = rank(scores(&[("zeta", 5.0), ("alpha", 5.0), ("mid", 5.0), ("top", 9.0)]), None);
        assert_eq!(r.document_ids().collect::<Vec<_>>(), vec!["top", "alpha", "mid", "zeta"]);
    }

    #[test]
    fn truncates_after_sorting() {
        let r = rank(scores(&[("a", 1.0), ("b", 4.0), ("c", 3.0), ("d", 2.0)]), Some(2));
        assert_eq!(r.document_ids().collect::<Vec<_>>(), vec!["b", "c"]);
        assert_eq!(r.total_hits, 4);
    }

    #[test]
    fn negative_scores_rank_last() {
        let r = rank(scores(&[("neg", -2.0), ("zero", 0.0), ("pos", 1.5)]), Some(10));
        assert_eq!(r.document_ids().collect::<Vec<_>>(), vec!["pos", "zero", "neg"]);
    }

    #[test]
    fn page_clamps_to_bounds() {
        let r = rank(scores(&[("a", 3.0), ("b", 2.0), ("c", 1.0)]), None);
        assert_eq!(r.page(1, 5).len(), 2);
        assert_eq!(r.page(1, 1)[0].document_id, "b");
        assert!(r.page(7, 2).is_empty());
    }

    proptest! {
        #[test]
        fn output_is_a_total_order(entries in prop::collection::hash_map("[a-z]{1,3}", -3i32..3, 0..20)) {
            let map: ScoreMap = entries.iter().map(|(k, v)| (k.clone(), f64::from(*v))).collect();
            let first = rank(map.clone(), None);
            let second = rank(map, None);
            prop_assert_eq!(&first, &second);
            for pair in first.documents.windows(2) {
                prop_assert_ne!(compare(&pair[0], &pair[1]), Ordering::Greater);
            }
        }
    }
}
