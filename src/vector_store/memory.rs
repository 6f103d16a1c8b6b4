//! In-memory vector index.
//!
//! Useful for testing and small local datasets.

use super::{cosine_similarity, Match, Record, VectorIndex};
use crate::error::{RelayError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

/// In-memory vector index with namespaces.
pub struct MemoryVectorIndex {
    namespaces: RwLock<HashMap<String, Vec<Record>>>,
}

impl MemoryVectorIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
        }
    }

    /// Load records from a JSON file mapping namespace names to record lists.
    ///
    /// ```json
    /// { "json-documents": [ { "id": "1", "values": [0.1, 0.2], "metadata": { "text": "..." } } ] }
    /// ```
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let namespaces: HashMap<String, Vec<Record>> = serde_json::from_str(&content)?;
        Ok(Self {
            namespaces: RwLock::new(namespaces),
        })
    }

    /// Insert or replace records in a namespace.
    pub fn upsert(&self, namespace: &str, records: Vec<Record>) -> Result<usize> {
        let mut namespaces = self
            .namespaces
            .write()
            .map_err(|_| RelayError::VectorIndex("Index lock poisoned".to_string()))?;
        let stored = namespaces.entry(namespace.to_string()).or_default();

        let count = records.len();
        for record in records {
            stored.retain(|r| r.id != record.id);
            stored.push(record);
        }
        Ok(count)
    }

    /// Number of records in a namespace.
    pub fn len(&self, namespace: &str) -> usize {
        self.namespaces
            .read()
            .map(|ns| ns.get(namespace).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

impl Default for MemoryVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for MemoryVectorIndex {
    async fn query(&self, vector: &[f32], top_k: usize, namespace: &str) -> Result<Vec<Match>> {
        let namespaces = self
            .namespaces
            .read()
            .map_err(|_| RelayError::VectorIndex("Index lock poisoned".to_string()))?;

        let Some(records) = namespaces.get(namespace) else {
            return Ok(Vec::new());
        };

        let mut matches: Vec<Match> = records
            .iter()
            .map(|record| Match {
                id: record.id.clone(),
                score: cosine_similarity(vector, &record.values),
                metadata: record.metadata.clone(),
            })
            .collect();

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(top_k);

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn seeded() -> MemoryVectorIndex {
        let index = MemoryVectorIndex::new();
        index
            .upsert(
                "docs",
                vec![
                    Record::with_text("a", vec![1.0, 0.0, 0.0], "alpha"),
                    Record::with_text("b", vec![0.7, 0.7, 0.0], "beta"),
                    Record::with_text("c", vec![0.0, 0.0, 1.0], "gamma"),
                ],
            )
            .unwrap();
        index
    }

    #[tokio::test]
    async fn test_query_orders_and_limits() {
        let index = seeded();
        let matches = index.query(&[1.0, 0.0, 0.0], 2, "docs").await.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].text(), "alpha");
        assert_eq!(matches[1].text(), "beta");
        assert!(matches[0].score > matches[1].score);
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let index = seeded();
        assert!(index.query(&[1.0, 0.0, 0.0], 2, "other").await.unwrap().is_empty());
        assert_eq!(index.len("docs"), 3);
        assert_eq!(index.len("other"), 0);
    }

    #[tokio::test]
    async fn test_upsert_replaces_by_id() {
        let index = seeded();
        index
            .upsert("docs", vec![Record::with_text("a", vec![0.0, 0.0, 1.0], "alpha v2")])
            .unwrap();

        assert_eq!(index.len("docs"), 3);
        let matches = index.query(&[0.0, 0.0, 1.0], 3, "docs").await.unwrap();
        let texts: Vec<&str> = matches.iter().take(2).map(Match::text).collect();
        assert!(texts.contains(&"alpha v2"));
        assert!(texts.contains(&"gamma"));
    }

    #[tokio::test]
    async fn test_load_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"json-documents": [{{"id": "p1", "values": [0.0, 1.0], "metadata": {{"text": "Dr. Lee, 5 stars", "subject": "Math"}}}}]}}"#
        )
        .unwrap();

        let index = MemoryVectorIndex::load_json(file.path()).unwrap();
        let matches = index.query(&[0.0, 1.0], 2, "json-documents").await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text(), "Dr. Lee, 5 stars");
        assert_eq!(matches[0].metadata["subject"], "Math");
    }
}
