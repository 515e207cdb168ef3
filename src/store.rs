//! Corpus storage trait and the in-memory reference implementation.
//!
//! The ranking engine only needs a linear keyword scan over flattened
//! chunk rows, so the trait is deliberately small: put, get, list, scan.
//! Implementations decide how corpora are persisted; the engine never
//! sees anything but [`ChunkRow`]s and [`ParsedDocument`]s.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ChunkRow, ParsedDocument};

/// Backend-agnostic storage for parsed corpora.
///
/// `scan_contains` is the engine's only read path at query time: a
/// case-insensitive substring scan over chunk text, capped at `limit`
/// rows, in stable corpus order (documents sorted by name, blocks in
/// document order).
#[async_trait]
pub trait CorpusStore: Send + Sync {
    /// Insert or replace one parsed document, keyed by its name.
    async fn put_corpus(&self, doc: ParsedDocument) -> Result<()>;

    /// Fetch one parsed document by name.
    async fn get_corpus(&self, name: &str) -> Result<Option<ParsedDocument>>;

    /// Names of all stored documents, sorted.
    async fn list_corpora(&self) -> Result<Vec<String>>;

    /// Chunk rows whose text contains `keyword` (case-insensitive), at
    /// most `limit` of them.
    async fn scan_contains(&self, keyword: &str, limit: usize) -> Result<Vec<ChunkRow>>;
}

/// Flatten one parsed document into scan rows. The header column carries
/// the block's section breadcrumb so the ranker can score header hits.
pub fn corpus_rows(doc: &ParsedDocument) -> Vec<ChunkRow> {
    doc.blocks
        .iter()
        .enumerate()
        .map(|(idx, block)| ChunkRow {
            document: doc.name.clone(),
            page: block.page,
            chunk_index: idx,
            text: block.text.clone(),
            header: block.breadcrumb(),
        })
        .collect()
}

/// In-memory store, used by tests and one-shot CLI runs.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<HashMap<String, ParsedDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CorpusStore for MemoryStore {
    async fn put_corpus(&self, doc: ParsedDocument) -> Result<()> {
        let mut docs = self
            .docs
            .write()
            .map_err(|_| anyhow::anyhow!("corpus store lock poisoned"))?;
        docs.insert(doc.name.clone(), doc);
        Ok(())
    }

    async fn get_corpus(&self, name: &str) -> Result<Option<ParsedDocument>> {
        let docs = self
            .docs
            .read()
            .map_err(|_| anyhow::anyhow!("corpus store lock poisoned"))?;
        Ok(docs.get(name).cloned())
    }

    async fn list_corpora(&self) -> Result<Vec<String>> {
        let docs = self
            .docs
            .read()
            .map_err(|_| anyhow::anyhow!("corpus store lock poisoned"))?;
        let mut names: Vec<String> = docs.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn scan_contains(&self, keyword: &str, limit: usize) -> Result<Vec<ChunkRow>> {
        let docs = self
            .docs
            .read()
            .map_err(|_| anyhow::anyhow!("corpus store lock poisoned"))?;
        let needle = keyword.to_lowercase();
        let mut names: Vec<&String> = docs.keys().collect();
        names.sort();

        let mut rows = Vec::new();
        'outer: for name in names {
            for row in corpus_rows(&docs[name]) {
                if row.text.to_lowercase().contains(&needle) {
                    rows.push(row);
                    if rows.len() >= limit {
                        break 'outer;
                    }
                }
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Block, Classification, DocumentStats};

    fn block(page: u32, text: &str, path: &[&str]) -> Block {
        Block {
            page,
            text: text.to_string(),
            dominant_font_size: 11.0,
            dominant_color: 0,
            is_header: false,
            section_path: path.iter().map(|s| s.to_string()).collect(),
            direct_header: path.last().unwrap_or(&"Document Start").to_string(),
            coverage_flags: vec![],
            primary_classification: Classification::General,
            max_priority: 0,
        }
    }

    fn doc(name: &str, blocks: Vec<Block>) -> ParsedDocument {
        ParsedDocument {
            name: name.to_string(),
            stats: DocumentStats {
                mode_font_size: 11.0,
                mode_color: 0,
                header_size_threshold: 12.0,
            },
            blocks,
        }
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let store = MemoryStore::new();
        let parsed = doc("Policy", vec![block(1, "grace period text", &["Definitions"])]);
        store.put_corpus(parsed.clone()).await.unwrap();
        assert_eq!(store.get_corpus("Policy").await.unwrap(), Some(parsed));
        assert_eq!(store.get_corpus("Missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let store = MemoryStore::new();
        store.put_corpus(doc("Zeta", vec![])).await.unwrap();
        store.put_corpus(doc("Alpha", vec![])).await.unwrap();
        assert_eq!(store.list_corpora().await.unwrap(), vec!["Alpha", "Zeta"]);
    }

    #[tokio::test]
    async fn test_scan_is_case_insensitive() {
        let store = MemoryStore::new();
        store
            .put_corpus(doc(
                "Policy",
                vec![
                    block(1, "The Grace Period is thirty days.", &["Definitions"]),
                    block(2, "unrelated paragraph", &["Definitions"]),
                ],
            ))
            .await
            .unwrap();
        let rows = store.scan_contains("grace period", 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].page, 1);
        assert_eq!(rows[0].header, "Definitions");
    }

    #[tokio::test]
    async fn test_scan_respects_limit() {
        let store = MemoryStore::new();
        let blocks = (0..20)
            .map(|i| block(1, &format!("claim number {}", i), &[]))
            .collect();
        store.put_corpus(doc("Policy", blocks)).await.unwrap();
        let rows = store.scan_contains("claim", 5).await.unwrap();
        assert_eq!(rows.len(), 5);
    }

    #[tokio::test]
    async fn test_scan_order_is_stable_across_documents() {
        let store = MemoryStore::new();
        store
            .put_corpus(doc("B-doc", vec![block(1, "premium due date", &[])]))
            .await
            .unwrap();
        store
            .put_corpus(doc("A-doc", vec![block(1, "premium amount", &[])]))
            .await
            .unwrap();
        let rows = store.scan_contains("premium", 10).await.unwrap();
        assert_eq!(rows[0].document, "A-doc");
        assert_eq!(rows[1].document, "B-doc");
    }

    #[tokio::test]
    async fn test_chunk_index_tracks_block_position() {
        let store = MemoryStore::new();
        store
            .put_corpus(doc(
                "Policy",
                vec![
                    block(1, "first block", &[]),
                    block(1, "second block with claim", &[]),
                ],
            ))
            .await
            .unwrap();
        let rows = store.scan_contains("claim", 10).await.unwrap();
        assert_eq!(rows[0].chunk_index, 1);
    }
}
