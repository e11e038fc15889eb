//! Query-dense excerpt selection.
//!
//! Every token gets a streak value: 0 for a non-match, otherwise one more than
//! the previous token's streak. A window's rank is the sum of the streaks in it,
//! so a run of k adjacent matches is worth 1 + 2 + ... + k instead of k. The
//! window sums are maintained over a ring of the last `width` streaks, which
//! keeps the scan linear in the document length.

use crate::index::DocumentId;
use crate::query::QueryTerm;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    pub document_id: DocumentId,
    pub text: String,
}

/// Case-insensitive set of the terms a snippet should concentrate.
#[derive(Debug, Clone, Default)]
pub struct TermMatcher {
    terms: HashSet<String>,
}

impl TermMatcher {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self { terms: terms.into_iter().map(|t| t.as_ref().to_lowercase()).collect() }
    }

    pub fn from_query(query: &[QueryTerm]) -> Self {
        Self::new(query.iter().map(|q| q.term.as_str()))
    }

    pub fn matches(&self, word: &str) -> bool {
        if self.terms.contains(word) {
            return true;
        }
        self.terms.contains(&word.to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnippetExtractor {
    pub width: usize,
    /// Tokens kept before the density peak so the peak does not sit on the window's trailing edge.
    pub lead: usize,
}

impl Default for SnippetExtractor {
    fn default() -> Self { Self { width: 50, lead: 25 } }
}

impl SnippetExtractor {
    pub fn new(width: usize, lead: usize) -> Self {
        Self { width: width.max(1), lead }
    }

    /// Index of the last token of the densest window, or 0 when no later
    /// window beats the first one.
    pub fn peak_index<S: AsRef<str>>(&self, words: &[S], matcher: &TermMatcher) -> usize {
        let width = self.width;
        if words.len() <= width {
            return 0;
        }

        let mut ring = vec![0u32; width];
        let mut rank: u64 = 0;
        let mut prev = 0u32;
        for (slot, word) in ring.iter_mut().zip(words) {
            *slot = if matcher.matches(word.as_ref()) { prev + 1 } else { 0 };
            prev = *slot;
            rank += u64::from(*slot);
        }

        let mut best = rank;
        let mut peak = 0;
        let mut end = 0;
        for (i, word) in words.iter().enumerate().skip(width) {
            rank -= u64::from(ring[end]);
            let before = ring[(end + width - 1) % width];
            ring[end] = if matcher.matches(word.as_ref()) { before + 1 } else { 0 };
            rank += u64::from(ring[end]);
            end = (end + 1) % width;

            if rank > best {
                best = rank;
                peak = i;
            }
        }
        peak
    }

    /// The excerpt as space-joined tokens, at most `width` of them.
    pub fn extract<S: AsRef<str>>(&self, words: &[S], matcher: &TermMatcher) -> String {
        if words.len() <= self.width {
            return join(words);
        }
        let peak = self.peak_index(words, matcher);
        let start = if peak > self.lead { peak - self.lead } else { 0 };
        let end = (start + self.width).min(words.len());
        join(&words[start..end])
    }
}

fn join<S: AsRef<str>>(words: &[S]) -> String {
    let mut out = String::new();
    for (i, w) in words.iter().enumerate() {
        if i > 0 { out.push(' '); }
        out.push_str(w.as_ref());
    }
    out
}
