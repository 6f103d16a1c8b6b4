//! Vector index abstraction for ragrelay.
//!
//! Provides a trait-based interface over nearest-neighbour backends.

mod memory;
mod pinecone;

pub use memory::MemoryVectorIndex;
pub use pinecone::PineconeIndex;

use crate::config::{require_env, Settings, VectorStoreProvider};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Metadata key holding a passage's text.
pub const TEXT_METADATA_KEY: &str = "text";

/// A stored vector with its metadata, in Pinecone's upsert shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Record ID.
    pub id: String,
    /// Embedding vector.
    pub values: Vec<f32>,
    /// Arbitrary metadata. Passage text lives under `text`.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Record {
    /// Create a record whose metadata carries only the passage text.
    pub fn with_text(id: impl Into<String>, values: Vec<f32>, text: impl Into<String>) -> Self {
        let mut metadata = Map::new();
        metadata.insert(TEXT_METADATA_KEY.to_string(), Value::String(text.into()));
        Self {
            id: id.into(),
            values,
            metadata,
        }
    }
}

/// A nearest-neighbour match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    /// Record ID.
    pub id: String,
    /// Similarity score (higher is better).
    pub score: f32,
    /// Metadata stored with the record.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Match {
    /// Passage text, or an empty string when the record has none.
    pub fn text(&self) -> &str {
        self.metadata
            .get(TEXT_METADATA_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

/// Trait for vector index implementations.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return at most `top_k` matches in `namespace`, most similar first.
    async fn query(&self, vector: &[f32], top_k: usize, namespace: &str) -> Result<Vec<Match>>;
}

/// Build the configured vector index.
///
/// Remote handles are resolved here, once, rather than on first query.
pub async fn create_index(settings: &Settings) -> Result<Arc<dyn VectorIndex>> {
    let store = &settings.vector_store;
    let index: Arc<dyn VectorIndex> = match store.provider {
        VectorStoreProvider::Pinecone => {
            let api_key = require_env(&store.api_key_env)?;
            let index = match &store.host {
                Some(host) => PineconeIndex::with_host(host, &api_key)?,
                None => PineconeIndex::connect(&store.index_name, &api_key).await?,
            };
            Arc::new(index)
        }
        VectorStoreProvider::Memory => {
            let index = match settings.documents_path() {
                Some(path) => MemoryVectorIndex::load_json(&path)?,
                None => MemoryVectorIndex::new(),
            };
            Arc::new(index)
        }
    };
    Ok(index)
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
