use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A distinct query term and how many times it occurred in the query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryTerm {
    pub term: String,
    pub weight: u32,
}

impl QueryTerm {
    pub fn new(term: impl Into<String>, weight: u32) -> Self {
        Self { term: term.into(), weight }
    }
}

/// Collapse normalized query tokens into weighted terms.
///
/// Output is sorted by term so callers see a stable order, though nothing
/// downstream depends on it.
pub fn process_query<I, S>(tokens: I) -> Vec<QueryTerm>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: HashMap<String, u32> = HashMap::new();
    for token in tokens {
        let token = token.as_ref();
        if token.is_empty() { continue; }
        *counts.entry(token.to_string()).or_insert(0) += 1;
    }
    let mut terms: Vec<QueryTerm> = counts.into_iter().map(|(term, weight)| QueryTerm { term, weight }).collect();
    terms.sort_by(|a, b| a.term.cmp(&b.term));
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_repeated_tokens() {
        let q = process_query(["cat", "dog", "cat", "cat"]);
        assert_eq!(q, vec![QueryTerm::new("cat", 3), QueryTerm::new("dog", 1)]);
    }

    #[test]
    fn empty_input_yields_no_terms() {
        assert!(process_query(Vec::<String>::new()).is_empty());
        assert!(process_query([""]).is_empty());
    }

    #[test]
    fn never_longer_than_input() {
        let input = ["a", "b", "a", "c", "b"];
        let q = process_query(input);
        assert!(q.len() <= input.len());
        assert!(q.iter().all(|t| t.weight >= 1));
        assert_eq!(q.iter().map(|t| t.weight as usize).sum::<usize>(), input.len());
    }
}
