//! OpenAI embeddings implementation.

use super::Embedder;
use crate::error::{RelayError, Result};
use crate::openai::create_default_client;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// OpenAI-based embedder.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Create a new OpenAI embedder with default model and dimensions.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_config("text-embedding-3-small", 1536, api_key, None)
    }

    /// Create a new OpenAI embedder with custom model and dimensions.
    pub fn with_config(
        model: &str,
        dimensions: usize,
        api_key: &str,
        api_base: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            client: create_default_client(api_base, api_key)?,
            model: model.to_string(),
            dimensions,
        })
    }

    /// Get the embedding dimensions.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text), fields(model = %self.model))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(EmbeddingInput::String(text.to_string()))
            .dimensions(self.dimensions as u32)
            .build()
            .map_err(|e| RelayError::Embedding(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| RelayError::OpenAI(format!("Embedding API error: {}", e)))?;

        let embedding = response
            .data
            .into_iter()
            .min_by_key(|e| e.index)
            .map(|e| e.embedding)
            .ok_or_else(|| RelayError::Embedding("Empty embedding response".to_string()))?;

        debug!("Generated embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
