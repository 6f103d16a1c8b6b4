//! Hugging Face feature-extraction embeddings.

use super::Embedder;
use crate::error::{RelayError, Result};
use crate::openai::DEFAULT_TIMEOUT_SECS;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default inference endpoint root. The model id and pipeline are appended.
const DEFAULT_API_BASE: &str = "https://router.huggingface.co/hf-inference/models";

/// Feature-extraction output: a pooled sentence vector or a batch of one.
#[derive(Deserialize)]
#[serde(untagged)]
enum FeatureExtraction {
    Single(Vec<f32>),
    Batch(Vec<Vec<f32>>),
}

/// Embedder backed by the Hugging Face inference API.
pub struct HuggingFaceEmbedder {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl HuggingFaceEmbedder {
    /// Create a new embedder for `model`.
    pub fn new(model: &str, api_key: &str, api_base: Option<&str>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        let base = api_base.unwrap_or(DEFAULT_API_BASE).trim_end_matches('/');
        let endpoint = format!("{}/{}/pipeline/feature-extraction", base, model);

        Ok(Self {
            http,
            endpoint,
            model: model.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Full URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Embedder for HuggingFaceEmbedder {
    #[instrument(skip(self, text), fields(model = %self.model))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Generating embedding for query ({} chars)", text.len());

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({ "inputs": text }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Embedding(format!("HTTP {}: {}", status, body)));
        }

        let embedding = match response.json::<FeatureExtraction>().await? {
            FeatureExtraction::Single(vector) => vector,
            FeatureExtraction::Batch(batch) => batch
                .into_iter()
                .next()
                .ok_or_else(|| RelayError::Embedding("Empty embedding response".to_string()))?,
        };

        if embedding.is_empty() {
            return Err(RelayError::Embedding("Empty embedding response".to_string()));
        }

        debug!("Generated embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
