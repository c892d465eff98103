//! Ingestion pipeline tests: extraction, persistence, file movement, and
//! the log-and-skip policy for per-file failures.

use async_trait::async_trait;
use nydas_node::config::{
    GeneralSettings, LlmSettings, RagSettings, SessionSettings, Settings,
};
use nydas_node::ingest;
use nydas_node::vector::{EmbedError, Embedder, HnswVectorStore, PassageStore};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Deterministic embedder: maps topic keywords onto fixed axes.
struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts
            .iter()
            .map(|t| {
                let t = t.to_lowercase();
                vec![
                    if t.contains("refund") { 1.0 } else { 0.1 },
                    if t.contains("shipping") { 1.0 } else { 0.1 },
                    if t.contains("warranty") { 1.0 } else { 0.1 },
                ]
            })
            .collect())
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Err(EmbedError::Unreachable("connection refused".to_string()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

fn settings_for(source: &Path, processed: &Path, store: &Path) -> Settings {
    Settings {
        general: GeneralSettings {
            logging_level: "info".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        llm: LlmSettings {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            embedding_model: "keyword".to_string(),
            device: "cpu".to_string(),
            batch_size: 2,
        },
        rag: RagSettings {
            vector_store_path: store.to_path_buf(),
            source_file_location: source.to_path_buf(),
            processed_file_location: processed.to_path_buf(),
            top_k: 4,
            score_threshold: 0.0,
        },
        session: SessionSettings::default(),
    }
}

struct Dirs {
    _root: TempDir,
    source: std::path::PathBuf,
    processed: std::path::PathBuf,
    store: std::path::PathBuf,
}

fn dirs() -> Dirs {
    let root = TempDir::new().unwrap();
    let source = root.path().join("incoming");
    let processed = root.path().join("processed");
    let store = root.path().join("store");
    fs::create_dir_all(&source).unwrap();
    Dirs {
        _root: root,
        source,
        processed,
        store,
    }
}

#[tokio::test]
async fn test_ingest_persists_passages_and_moves_files() {
    let dirs = dirs();
    fs::write(
        dirs.source.join("policy.txt"),
        "Refunds are issued within 30 days of purchase.",
    )
    .unwrap();
    fs::write(
        dirs.source.join("notes.md"),
        "Shipping takes 3-5 business days.",
    )
    .unwrap();

    let settings = settings_for(&dirs.source, &dirs.processed, &dirs.store);
    let report = ingest::process_files(&settings, Arc::new(KeywordEmbedder))
        .await
        .unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.passages, 2);

    // files moved out of the source directory
    assert!(!dirs.source.join("policy.txt").exists());
    assert!(dirs.processed.join("policy.txt").exists());
    assert!(dirs.processed.join("notes.md").exists());

    // store holds one record per chunk with provenance
    let records = PassageStore::new(&dirs.store).load().unwrap();
    assert_eq!(records.len(), 2);
    let sources: Vec<&str> = records.iter().map(|r| r.source.as_str()).collect();
    assert!(sources.contains(&"policy.txt"));
    assert!(sources.contains(&"notes.md"));
}

#[tokio::test]
async fn test_unsupported_format_is_skipped_in_place() {
    let dirs = dirs();
    fs::write(dirs.source.join("scan.pdf"), b"%PDF-1.4 binary").unwrap();
    fs::write(dirs.source.join("ok.txt"), "Warranty lasts two years.").unwrap();

    let settings = settings_for(&dirs.source, &dirs.processed, &dirs.store);
    let report = ingest::process_files(&settings, Arc::new(KeywordEmbedder))
        .await
        .unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.skipped, 1);

    // the unsupported file stays where it was
    assert!(dirs.source.join("scan.pdf").exists());
    assert!(!dirs.source.join("ok.txt").exists());
}

#[tokio::test]
async fn test_embedding_failure_leaves_file_and_continues() {
    let dirs = dirs();
    fs::write(dirs.source.join("a.txt"), "first document").unwrap();
    fs::write(dirs.source.join("b.txt"), "second document").unwrap();

    let settings = settings_for(&dirs.source, &dirs.processed, &dirs.store);
    let report = ingest::process_files(&settings, Arc::new(FailingEmbedder))
        .await
        .unwrap();

    assert_eq!(report.processed, 0);
    assert_eq!(report.skipped, 2);

    // nothing moved, nothing persisted
    assert!(dirs.source.join("a.txt").exists());
    assert!(dirs.source.join("b.txt").exists());
    assert!(PassageStore::new(&dirs.store).load().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_source_directory_fails_the_batch() {
    let dirs = dirs();
    let settings = settings_for(
        &dirs.source.join("does-not-exist"),
        &dirs.processed,
        &dirs.store,
    );

    let result = ingest::process_files(&settings, Arc::new(KeywordEmbedder)).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_ingested_passages_are_searchable() {
    let dirs = dirs();
    fs::write(
        dirs.source.join("policy.txt"),
        "Refunds are issued within 30 days of purchase.",
    )
    .unwrap();
    fs::write(
        dirs.source.join("delivery.txt"),
        "Shipping takes 3-5 business days.",
    )
    .unwrap();

    let settings = settings_for(&dirs.source, &dirs.processed, &dirs.store);
    ingest::process_files(&settings, Arc::new(KeywordEmbedder))
        .await
        .unwrap();

    let index =
        HnswVectorStore::open(&dirs.store, Arc::new(KeywordEmbedder), 1, 0.0).unwrap();
    assert_eq!(index.passage_count(), 2);

    use nydas_node::vector::VectorIndex;
    let passages = index.similarity_search("refund question").await.unwrap();
    assert_eq!(passages.len(), 1);
    assert!(passages[0].text.contains("Refunds"));
    assert_eq!(passages[0].source, "policy.txt");
}
