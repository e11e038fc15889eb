use crate::index::DocumentId;
use std::collections::HashMap;

/// Document id to accumulated score. Scores are only ever added to, never replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreMap {
    scores: HashMap<DocumentId, f64>,
}

impl ScoreMap {
    pub fn new() -> Self { Self::default() }

    pub fn add(&mut self, document_id: impl Into<DocumentId>, score: f64) {
        *self.scores.entry(document_id.into()).or_insert(0.0) += score;
    }

    pub fn get(&self, document_id: &str) -> Option<f64> {
        self.scores.get(document_id).copied()
    }

    pub fn len(&self) -> usize { self.scores.len() }

    pub fn is_empty(&self) -> bool { self.scores.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&DocumentId, f64)> {
        self.scores.iter().map(|(id, s)| (id, *s))
    }

    /// Union with summation. Documents missing from one side contribute 0 from it.
    pub fn merge(mut self, other: ScoreMap) -> ScoreMap {
        // fold the smaller map into the larger one
        let (mut into, from) = if self.scores.len() >= other.scores.len() {
            (std::mem::take(&mut self.scores), other.scores)
        } else {
            (other.scores, std::mem::take(&mut self.scores))
        };
        for (id, score) in from {
            *into.entry(id).or_insert(0.0) += score;
        }
        ScoreMap { scores: into }
    }
}

impl FromIterator<(DocumentId, f64)> for ScoreMap {
    fn from_iter<T: IntoIterator<Item = (DocumentId, f64)>>(iter: T) -> Self {
        let mut map = ScoreMap::new();
        for (id, score) in iter {
            map.add(id, score);
        }
        map
    }
}

impl IntoIterator for ScoreMap {
    type Item = (DocumentId, f64);
    type IntoIter = std::collections::hash_map::IntoIter<DocumentId, f64>;

    fn into_iter(self) -> Self::IntoIter { self.scores.into_iter() }
}

/// Fold any number of per-term maps into one aggregate.
pub fn merge_all<I: IntoIterator<Item = ScoreMap>>(maps: I) -> ScoreMap {
    maps.into_iter().fold(ScoreMap::new(), ScoreMap::merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn map(entries: &[(&str, f64)]) -> ScoreMap {
        entries.iter().map(|(id, s)| (id.to_string(), *s)).collect()
    }

    #[test]
    fn missing_term_contributes_zero() {
        let a = map(&[("d1", 3.25), ("d2", 1.0)]);
        let b = map(&[("d2", 2.0)]);
        let merged = a.merge(b);
        assert_eq!(merged.get("d1"), Some(3.25));
        assert_eq!(merged.get("d2"), Some(3.0));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn merging_with_empty_is_identity() {
        let a = map(&[("d1", 0.5)]);
        assert_eq!(a.clone().merge(ScoreMap::new()), a);
        assert_eq!(ScoreMap::new().merge(a.clone()), a);
    }

    #[test]
    fn merge_all_sums_every_term() {
        let merged = merge_all(vec![map(&[("a", 1.0)]), map(&[("a", 2.0), ("b", 1.0)]), map(&[("b", 4.0)])]);
        assert_eq!(merged.get("a"), Some(3.0));
        assert_eq!(merged.get("b"), Some(5.0));
    }

    fn arb_map() -> impl Strategy<Value = ScoreMap> {
        prop::collection::hash_map("[a-e]", -50.0f64..50.0, 0..5)
            .prop_map(|m| m.into_iter().collect())
    }

    fn assert_close(x: &ScoreMap, y: &ScoreMap) {
        assert_eq!(x.len(), y.len());
        for (id, s) in x.iter() {
            let other = y.get(id).expect("same keys");
            assert!((s - other).abs() < 1e-9, "{id}: {s} vs {other}");
        }
    }

    proptest! {
        #[test]
        fn merge_is_commutative(a in arb_map(), b in arb_map()) {
            assert_close(&a.clone().merge(b.clone()), &b.merge(a));
        }

        #[test]
        fn merge_is_associative(a in arb_map(), b in arb_map(), c in arb_map()) {
            let left = a.clone().merge(b.clone()).merge(c.clone());
            let right = a.merge(b.merge(c));
            assert_close(&left, &right);
        }

        #[test]
        fn fold_order_does_not_matter(maps in prop::collection::vec(arb_map(), 0..6)) {
            let forward = merge_all(maps.clone());
            let backward = merge_all(maps.into_iter().rev());
            assert_close(&forward, &backward);
        }
    }
}
