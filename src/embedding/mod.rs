//! Embedding generation for query retrieval.

mod huggingface;
mod openai;

pub use huggingface::HuggingFaceEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::{require_env, EmbeddingProvider, EmbeddingSettings};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Name of the model producing the vectors.
    fn model(&self) -> &str;
}

/// Build the configured embedder, reading its API key from the environment.
pub fn create_embedder(settings: &EmbeddingSettings) -> Result<Arc<dyn Embedder>> {
    let api_key = require_env(settings.key_env())?;
    let embedder: Arc<dyn Embedder> = match settings.provider {
        EmbeddingProvider::HuggingFace => Arc::new(HuggingFaceEmbedder::new(
            &settings.model,
            &api_key,
            settings.api_base.as_deref(),
        )?),
        EmbeddingProvider::OpenAI => Arc::new(OpenAIEmbedder::with_config(
            &settings.model,
            settings.dimensions as usize,
            &api_key,
            settings.api_base.as_deref(),
        )?),
    };
    Ok(embedder)
}
