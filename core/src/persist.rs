//! Read-only index directory produced by an external indexer.
//!
//! ```text
//! dictionary.bin                     term -> (term id, document frequency)   bincode
//! docs.bin                           document id -> DocMeta                  bincode
//! meta.json                          corpus counters                        json
//! postings/{term_id:08}.postings.bin Vec<Posting>, relevance-proxy order    bincode
//! texts/*.txt                        whitespace-separated document text
//! ```

use crate::index::{DocMeta, DocumentId, Posting, TermId};
use crate::store::{DocumentStore, PostingsStore};
use anyhow::{anyhow, Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u64,
    /// Sum of all document lengths.
    pub total_tokens: u64,
    pub created_at: String,
    pub version: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TermEntry {
    pub term_id: TermId,
    pub document_frequency: u64,
}

pub type Dictionary = HashMap<String, TermEntry>;

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn dictionary(&self) -> PathBuf { self.root.join("dictionary.bin") }
    fn docs(&self) -> PathBuf { self.root.join("docs.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    fn postings_dir(&self) -> PathBuf { self.root.join("postings") }
    fn postings(&self, term_id: TermId) -> PathBuf { self.postings_dir().join(format!("{term_id:08}.postings.bin")) }
}

fn write_bincode<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    let mut f = File::create(path)?;
    let bytes = bincode::serialize(value)?;
    f.write_all(&bytes)?;
    Ok(())
}

fn read_bincode<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let mut f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    Ok(bincode::deserialize(&buf)?)
}

pub fn save_dictionary(paths: &IndexPaths, dict: &Dictionary) -> Result<()> {
    write_bincode(&paths.dictionary(), dict)
}

pub fn load_dictionary(paths: &IndexPaths) -> Result<Dictionary> {
    read_bincode(&paths.dictionary())
}

pub fn save_docs(paths: &IndexPaths, docs: &HashMap<DocumentId, DocMeta>) -> Result<()> {
    write_bincode(&paths.docs(), docs)
}

pub fn load_docs(paths: &IndexPaths) -> Result<HashMap<DocumentId, DocMeta>> {
    read_bincode(&paths.docs())
}

pub fn save_postings_for_term(paths: &IndexPaths, term_id: TermId, postings: &[Posting]) -> Result<()> {
    write_bincode(&paths.postings(term_id), &postings)
}

pub fn load_postings_for_term(paths: &IndexPaths, term_id: TermId) -> Result<Vec<Posting>> {
    read_bincode(&paths.postings(term_id))
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta()).with_context(|| format!("opening {}", paths.meta().display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Store over an index directory. The dictionary, document table and
/// counters are read up front; postings lists are read on first use and cached.
pub struct DiskStore {
    paths: IndexPaths,
    dictionary: Dictionary,
    docs: HashMap<DocumentId, DocMeta>,
    meta: MetaFile,
    postings_cache: RwLock<HashMap<TermId, Arc<Vec<Posting>>>>,
}

impl DiskStore {
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let paths = IndexPaths::new(root);
        let dictionary = load_dictionary(&paths)?;
        let docs = load_docs(&paths)?;
        let meta = load_meta(&paths)?;
        tracing::debug!(terms = dictionary.len(), docs = docs.len(), num_docs = meta.num_docs, "index header loaded");
        Ok(Self { paths, dictionary, docs, meta, postings_cache: RwLock::new(HashMap::new()) })
    }

    fn doc(&self, document_id: &str) -> Result<&DocMeta> {
        self.docs.get(document_id).ok_or_else(|| anyhow!("unknown document {document_id}"))
    }

    fn postings_list(&self, term_id: TermId) -> Result<Arc<Vec<Posting>>> {
        if let Some(list) = self.postings_cache.read().get(&term_id) {
            return Ok(Arc::clone(list));
        }
        let list = Arc::new(load_postings_for_term(&self.paths, term_id)?);
        self.postings_cache.write().insert(term_id, Arc::clone(&list));
        Ok(list)
    }
}

impl PostingsStore for DiskStore {
    fn postings(&self, term: &str, offset: usize, limit: usize) -> Result<Vec<Posting>> {
        let Some(entry) = self.dictionary.get(term) else { return Ok(Vec::new()) };
        let list = self.postings_list(entry.term_id)?;
        Ok(list.iter().skip(offset).take(limit).cloned().collect())
    }

    fn document_frequency(&self, term: &str) -> Result<u64> {
        Ok(self.dictionary.get(term).map_or(0, |e| e.document_frequency))
    }

    fn total_documents(&self) -> Result<u64> { Ok(self.meta.num_docs) }

    fn document_length(&self, document_id: &str) -> Result<u64> {
        Ok(self.doc(document_id)?.length)
    }

    fn average_document_length(&self) -> Result<f64> {
        if self.meta.num_docs == 0 {
            return Ok(0.0);
        }
        Ok(self.meta.total_tokens as f64 / self.meta.num_docs as f64)
    }
}

impl DocumentStore for DiskStore {
    fn tokens(&self, document_id: &str) -> Result<Vec<String>> {
        let meta = self.doc(document_id)?;
        let rel = meta.text_path.as_ref().ok_or_else(|| anyhow!("no stored text for {document_id}"))?;
        let path = self.paths.root.join(rel);
        let text = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        Ok(text.split_whitespace().map(str::to_string).collect())
    }

    fn title(&self, document_id: &str) -> Result<Option<String>> {
        Ok(Some(self.doc(document_id)?.title.clone()))
    }

    fn url(&self, document_id: &str) -> Result<Option<String>> {
        Ok(self.doc(document_id)?.url.clone())
    }
}
