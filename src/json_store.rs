//! File-backed corpus store: one pretty-printed JSON file per document.
//!
//! Serialization goes through the same serde models the parser produces,
//! so a corpus written here reloads bit-for-bit: every block keeps its
//! section path, coverage flags, and statistics. Good enough for corpora
//! that fit comfortably in memory, which parsed policy documents do.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;

use crate::models::{ChunkRow, ParsedDocument};
use crate::store::{corpus_rows, CorpusStore};

pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create store directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Document names become filenames; anything outside `[A-Za-z0-9._-]`
    /// is replaced so names can never escape the store directory.
    fn path_for(&self, name: &str) -> PathBuf {
        let safe: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }

    async fn load_all(&self) -> Result<Vec<ParsedDocument>> {
        let mut entries = fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("failed to read store directory {}", self.dir.display()))?;
        let mut docs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let raw = fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let doc: ParsedDocument = serde_json::from_str(&raw)
                    .with_context(|| format!("corrupt corpus file {}", path.display()))?;
                docs.push(doc);
            }
        }
        docs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(docs)
    }
}

#[async_trait]
impl CorpusStore for JsonFileStore {
    async fn put_corpus(&self, doc: ParsedDocument) -> Result<()> {
        let path = self.path_for(&doc.name);
        let json = serde_json::to_string_pretty(&doc)?;
        fs::write(&path, json)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    async fn get_corpus(&self, name: &str) -> Result<Option<ParsedDocument>> {
        let path = self.path_for(name);
        match fs::read_to_string(&path).await {
            Ok(raw) => {
                let doc: ParsedDocument = serde_json::from_str(&raw)
                    .with_context(|| format!("corrupt corpus file {}", path.display()))?;
                Ok(Some(doc))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    async fn list_corpora(&self) -> Result<Vec<String>> {
        Ok(self.load_all().await?.into_iter().map(|d| d.name).collect())
    }

    async fn scan_contains(&self, keyword: &str, limit: usize) -> Result<Vec<ChunkRow>> {
        let needle = keyword.to_lowercase();
        let mut rows = Vec::new();
        'outer: for doc in self.load_all().await? {
            for row in corpus_rows(&doc) {
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
    use crate::models::{Block, Classification, CoverageFlag, DocumentStats};

    fn sample_doc(name: &str) -> ParsedDocument {
        ParsedDocument {
            name: name.to_string(),
            stats: DocumentStats {
                mode_font_size: 11.0,
                mode_color: 0,
                header_size_threshold: 13.0,
            },
            blocks: vec![Block {
                page: 2,
                text: "Pre-existing diseases carry a waiting period of two years.".to_string(),
                dominant_font_size: 11.0,
                dominant_color: 0,
                is_header: false,
                section_path: vec!["Exclusions".to_string()],
                direct_header: "Exclusions".to_string(),
                coverage_flags: vec![CoverageFlag {
                    label: Classification::PreExisting,
                    priority: 9,
                    matched_terms: vec!["pre-existing".to_string()],
                }],
                primary_classification: Classification::PreExisting,
                max_priority: 9,
            }],
        }
    }

    #[tokio::test]
    async fn test_round_trip_preserves_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(tmp.path()).await.unwrap();
        let doc = sample_doc("HealthPolicy");
        store.put_corpus(doc.clone()).await.unwrap();
        let back = store.get_corpus("HealthPolicy").await.unwrap().unwrap();
        assert_eq!(doc, back);
    }

    #[tokio::test]
    async fn test_missing_corpus_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(tmp.path()).await.unwrap();
        assert_eq!(store.get_corpus("Nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_and_scan() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(tmp.path()).await.unwrap();
        store.put_corpus(sample_doc("B-policy")).await.unwrap();
        store.put_corpus(sample_doc("A-policy")).await.unwrap();
        assert_eq!(
            store.list_corpora().await.unwrap(),
            vec!["A-policy", "B-policy"]
        );
        let rows = store.scan_contains("waiting period", 10).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].document, "A-policy");
        assert_eq!(rows[0].header, "Exclusions");
    }

    #[tokio::test]
    async fn test_unsafe_names_stay_in_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(tmp.path()).await.unwrap();
        store.put_corpus(sample_doc("../escape/attempt")).await.unwrap();
        let back = store.get_corpus("../escape/attempt").await.unwrap();
        assert!(back.is_some());
        // Nothing outside the store directory was written.
        assert!(!tmp.path().join("..").join("escape").exists());
    }
}
