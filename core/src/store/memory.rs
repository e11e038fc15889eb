use super::{DocumentStore, PostingsStore};
use crate::index::{DocumentId, Posting};
use anyhow::{anyhow, Result};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
struct StoredDocument {
    tokens: Vec<String>,
    title: Option<String>,
    url: Option<String>,
}

/// Postings and document text held in memory.
///
/// Postings lists are ordered by term frequency descending, then document id,
/// standing in for whatever relevance proxy a real index maintains.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    postings: HashMap<String, Vec<Posting>>,
    documents: HashMap<DocumentId, StoredDocument>,
    total_tokens: u64,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// Index a document's tokens as given; callers normalize beforehand.
    /// Re-adding an id replaces the earlier document.
    pub fn add_document<I, S>(&mut self, document_id: impl Into<DocumentId>, tokens: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let document_id = document_id.into();
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        self.remove(&document_id);

        let mut counts: HashMap<&str, u32> = HashMap::new();
        for t in &tokens {
            *counts.entry(t.as_str()).or_insert(0) += 1;
        }
        for (term, tf) in counts {
            let list = self.postings.entry(term.to_string()).or_default();
            list.push(Posting::new(document_id.clone(), tf));
            list.sort_by(|a, b| b.term_frequency.cmp(&a.term_frequency).then_with(|| a.document_id.cmp(&b.document_id)));
        }
        self.total_tokens += tokens.len() as u64;
        self.documents.insert(document_id, StoredDocument { tokens, ..Default::default() });
        self
    }

    pub fn with_document(mut self, document_id: &str, text: &str) -> Self {
        self.add_document(document_id, text.split_whitespace());
        self
    }

    pub fn set_title(&mut self, document_id: &str, title: impl Into<String>) {
        if let Some(doc) = self.documents.get_mut(document_id) {
            doc.title = Some(title.into());
        }
    }

    pub fn set_url(&mut self, document_id: &str, url: impl Into<String>) {
        if let Some(doc) = self.documents.get_mut(document_id) {
            doc.url = Some(url.into());
        }
    }

    fn remove(&mut self, document_id: &str) {
        let Some(old) = self.documents.remove(document_id) else { return };
        self.total_tokens -= old.tokens.len() as u64;
        self.postings.retain(|_, list| {
            list.retain(|p| p.document_id != document_id);
            !list.is_empty()
        });
    }

    fn document(&self, document_id: &str) -> Result<&StoredDocument> {
        self.documents.get(document_id).ok_or_else(|| anyhow!("unknown document {document_id}"))
    }
}

impl PostingsStore for MemoryStore {
    fn postings(&self, term: &str, offset: usize, limit: usize) -> Result<Vec<Posting>> {
        Ok(self
            .postings
            .get(term)
            .map(|list| list.iter().skip(offset).take(limit).cloned().collect())
            .unwrap_or_default())
    }

    fn document_frequency(&self, term: &str) -> Result<u64> {
        Ok(self.postings.get(term).map_or(0, |l| l.len() as u64))
    }

    fn total_documents(&self) -> Result<u64> { Ok(self.documents.len() as u64) }

    fn document_length(&self, document_id: &str) -> Result<u64> {
        Ok(self.document(document_id)?.tokens.len() as u64)
    }

    fn average_document_length(&self) -> Result<f64> {
        if self.documents.is_empty() {
            return Ok(0.0);
        }
        Ok(self.total_tokens as f64 / self.documents.len() as f64)
    }
}

impl DocumentStore for MemoryStore {
    fn tokens(&self, document_id: &str) -> Result<Vec<String>> {
        Ok(self.document(document_id)?.tokens.clone())
    }

    fn title(&self, document_id: &str) -> Result<Option<String>> {
        Ok(self.document(document_id)?.title.clone())
    }

    fn url(&self, document_id: &str) -> Result<Option<String>> {
        Ok(self.document(document_id)?.url.clone())
    }
}
