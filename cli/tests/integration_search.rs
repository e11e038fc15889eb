use search_cli::{open_index, QueryOptions};
use search_core::persist::{save_dictionary, save_docs, save_meta, save_postings_for_term, Dictionary, IndexPaths, MetaFile, TermEntry};
use search_core::{DocMeta, Posting, SearchConfig};
use std::collections::HashMap;
use std::fs;

fn build_tiny_index(dir: &std::path::Path) {
    let paths = IndexPaths::new(dir);
    fs::create_dir_all(dir.join("texts")).unwrap();

    // "rust" -> term 0, "cargo" -> term 1
    let mut dict = Dictionary::new();
    dict.insert("rust".to_string(), TermEntry { term_id: 0, document_frequency: 2 });
    dict.insert("cargo".to_string(), TermEntry { term_id: 1, document_frequency: 1 });
    save_dictionary(&paths, &dict).unwrap();

    let texts = [
        ("doc0", "Rust is great. rust rust systems programming with cargo and rust."),
        ("doc1", "Learning rust."),
        ("doc2", "Gardening tips for spring."),
        ("doc3", "Baking bread at home."),
        ("doc4", "Birds of the northern coast."),
    ];
    let mut docs: HashMap<String, DocMeta> = HashMap::new();
    let mut total_tokens = 0;
    for (id, text) in texts {
        let rel = format!("texts/{id}.txt");
        fs::write(dir.join(&rel), text).unwrap();
        let length = text.split_whitespace().count() as u64;
        total_tokens += length;
        docs.insert(id.into(), DocMeta { title: format!("Title {id}"), url: Some(format!("https://example.org/{id}")), length, text_path: Some(rel) });
    }
    save_docs(&paths, &docs).unwrap();

    // Postings in the store's relevance order
    save_postings_for_term(&paths, 0, &[Posting::new("doc0", 4), Posting::new("doc1", 1)]).unwrap();
    save_postings_for_term(&paths, 1, &[Posting::new("doc0", 1)]).unwrap();

    let meta = MetaFile { num_docs: 5, total_tokens, created_at: "2024-01-01T00:00:00Z".into(), version: 1 };
    save_meta(&paths, &meta).unwrap();
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let dir = tempfile::tempdir().unwrap();
    build_tiny_index(dir.path());
    let app = open_index(dir.path(), SearchConfig::default()).unwrap();

    let resp = app.query("Rust", QueryOptions::default()).await;
    assert!(resp.failures.is_empty(), "{:?}", resp.failures);
    assert_eq!(resp.total_hits, 2);
    let ids: Vec<&str> = resp.results.iter().map(|r| r.document_id.as_str()).collect();
    assert_eq!(ids, vec!["doc0", "doc1"]);
    assert_eq!(resp.results[0].title.as_deref(), Some("Title doc0"));
    assert_eq!(resp.results[1].url.as_deref(), Some("https://example.org/doc1"));
    assert_eq!(resp.results[1].snippet.as_deref(), Some("Learning rust."));
}

#[tokio::test]
async fn multi_term_query_and_offset() {
    let dir = tempfile::tempdir().unwrap();
    build_tiny_index(dir.path());
    let app = open_index(dir.path(), SearchConfig::default()).unwrap();

    let resp = app.query("rust cargo", QueryOptions { offset: 1, highlight: false }).await;
    assert_eq!(resp.total_hits, 2);
    assert_eq!(resp.offset, 1);
    assert_eq!(resp.results.len(), 1);
    assert_eq!(resp.results[0].document_id, "doc1");
}

#[tokio::test]
async fn highlighted_snippets_and_json_shape() {
    let dir = tempfile::tempdir().unwrap();
    build_tiny_index(dir.path());
    let app = open_index(dir.path(), SearchConfig::default()).unwrap();

    let resp = app.query("rust", QueryOptions { offset: 0, highlight: true }).await;
    assert_eq!(resp.results[1].snippet.as_deref(), Some("Learning <em>rust</em>."));
    let json: serde_json::Value = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["results"].as_array().unwrap().len(), 2);
    assert!(json["took_s"].is_number());
}

#[tokio::test]
async fn unknown_and_empty_queries_are_empty() {
    let dir = tempfile::tempdir().unwrap();
    build_tiny_index(dir.path());
    let app = open_index(dir.path(), SearchConfig::default()).unwrap();

    let resp = app.query("zebra", QueryOptions::default()).await;
    assert_eq!(resp.total_hits, 0);
    assert!(resp.results.is_empty());
    let resp = app.query("   ", QueryOptions::default()).await;
    assert!(resp.results.is_empty());
    assert!(resp.failures.is_empty());
}

#[tokio::test]
async fn missing_text_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    build_tiny_index(dir.path());
    fs::remove_file(dir.path().join("texts/doc1.txt")).unwrap();
    let app = open_index(dir.path(), SearchConfig::default()).unwrap();

    let resp = app.query("rust", QueryOptions::default()).await;
    assert_eq!(resp.results.len(), 2);
    assert!(resp.results[1].snippet.is_none());
    assert_eq!(resp.failures.len(), 1);
}
