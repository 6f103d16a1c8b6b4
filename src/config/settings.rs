//! Configuration settings for ragrelay.

use crate::error::{RelayError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub cache: CacheSettings,
    pub embedding: EmbeddingSettings,
    pub vector_store: VectorStoreSettings,
    pub generation: GenerationSettings,
    pub prompts: PromptSettings,
    pub client: ClientSettings,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Response cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Lifetime of a cached answer, counted from insertion.
    pub ttl_seconds: u64,
    /// Maximum number of cached answers.
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: 3600,
            max_capacity: 10_000,
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Embedding provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Hugging Face feature-extraction inference API.
    #[default]
    HuggingFace,
    /// OpenAI embeddings endpoint.
    OpenAI,
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(EmbeddingProvider::HuggingFace),
            "openai" => Ok(EmbeddingProvider::OpenAI),
            _ => Err(format!("Unknown embedding provider: {}", s)),
        }
    }
}

impl std::fmt::Display for EmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbeddingProvider::HuggingFace => write!(f, "huggingface"),
            EmbeddingProvider::OpenAI => write!(f, "openai"),
        }
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Embedding provider (huggingface, openai).
    pub provider: EmbeddingProvider,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions (used by the openai provider).
    pub dimensions: u32,
    /// Override for the provider's API base URL.
    pub api_base: Option<String>,
    /// Environment variable holding the provider API key. Provider default when unset.
    pub api_key_env: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::HuggingFace,
            model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            dimensions: 384,
            api_base: None,
            api_key_env: None,
        }
    }
}

impl EmbeddingSettings {
    /// Environment variable the embedding key is read from.
    pub fn key_env(&self) -> &str {
        match (&self.api_key_env, self.provider) {
            (Some(name), _) => name.as_str(),
            (None, EmbeddingProvider::HuggingFace) => "HUGGINGFACE_API_KEY",
            (None, EmbeddingProvider::OpenAI) => "OPENAI_API_KEY",
        }
    }
}

/// Vector index provider type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreProvider {
    /// Hosted Pinecone index.
    #[default]
    Pinecone,
    /// In-process index, optionally loaded from a JSON file.
    Memory,
}

impl std::fmt::Display for VectorStoreProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorStoreProvider::Pinecone => write!(f, "pinecone"),
            VectorStoreProvider::Memory => write!(f, "memory"),
        }
    }
}

/// Vector index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreSettings {
    /// Vector index provider (pinecone, memory).
    pub provider: VectorStoreProvider,
    /// Name of the Pinecone index.
    pub index_name: String,
    /// Namespace queried for context passages.
    pub namespace: String,
    /// Number of passages to retrieve per query.
    pub top_k: usize,
    /// Data-plane host. Resolved through the control plane when unset.
    pub host: Option<String>,
    /// Environment variable holding the Pinecone API key.
    pub api_key_env: String,
    /// JSON file of records for the memory provider.
    pub documents_path: Option<String>,
}

impl Default for VectorStoreSettings {
    fn default() -> Self {
        Self {
            provider: VectorStoreProvider::Pinecone,
            index_name: "json".to_string(),
            namespace: "json-documents".to_string(),
            top_k: 2,
            host: None,
            api_key_env: "PINECONE_API_KEY".to_string(),
            documents_path: None,
        }
    }
}

/// Completion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Chat model used for answers.
    pub model: String,
    /// Base URL of an OpenAI-compatible API.
    pub api_base: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Sampling temperature. Provider default when unset.
    pub temperature: Option<f32>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "google/gemma-2-9b-it:free".to_string(),
            api_base: "https://openrouter.ai/api/v1".to_string(),
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            temperature: None,
            timeout_seconds: 300,
        }
    }
}

/// Prompt settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    /// System instruction sent with every completion.
    pub system: String,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            system: super::prompts::DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Settings used by the streaming client commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of a running relay server.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_seconds: 300,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => Self::expand_path(&p.to_string_lossy()),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| RelayError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ragrelay")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded documents path for the memory index, if any.
    pub fn documents_path(&self) -> Option<PathBuf> {
        self.vector_store
            .documents_path
            .as_deref()
            .map(Self::expand_path)
    }

    /// Names of the environment variables the server needs with this configuration.
    pub fn required_secrets(&self) -> Vec<&str> {
        let mut keys = vec![self.generation.api_key_env.as_str(), self.embedding.key_env()];
        if self.vector_store.provider == VectorStoreProvider::Pinecone {
            keys.push(self.vector_store.api_key_env.as_str());
        }
        keys
    }
}

/// Read a required secret from the environment.
pub fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(RelayError::Config(format!("{} is empty", name))),
        Err(_) => Err(RelayError::Config(format!(
            "{} not set. Export it or add it to a .env file",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.cache.ttl(), Duration::from_secs(3600));
        assert_eq!(settings.vector_store.top_k, 2);
        assert_eq!(settings.vector_store.namespace, "json-documents");
        assert_eq!(settings.server.port, 8000);
        assert_eq!(
            settings.required_secrets(),
            vec!["OPENROUTER_API_KEY", "HUGGINGFACE_API_KEY", "PINECONE_API_KEY"]
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [cache]
            ttl_seconds = 60

            [vector_store]
            provider = "memory"
            "#,
        )
        .unwrap();

        assert_eq!(settings.cache.ttl_seconds, 60);
        assert_eq!(settings.cache.max_capacity, 10_000);
        assert_eq!(settings.vector_store.provider, VectorStoreProvider::Memory);
        assert_eq!(settings.required_secrets().len(), 2);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.server.port = 9123;
        settings.embedding.provider = EmbeddingProvider::OpenAI;
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.server.port, 9123);
        assert_eq!(loaded.embedding.provider, EmbeddingProvider::OpenAI);
        assert_eq!(loaded.embedding.key_env(), "OPENAI_API_KEY");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.generation.model, "google/gemma-2-9b-it:free");
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("HF".parse::<EmbeddingProvider>().unwrap(), EmbeddingProvider::HuggingFace);
        assert_eq!("openai".parse::<EmbeddingProvider>().unwrap(), EmbeddingProvider::OpenAI);
        assert!("cohere".parse::<EmbeddingProvider>().is_err());
    }

    #[test]
    fn test_require_env_missing() {
        let err = require_env("RAGRELAY_TEST_SURELY_UNSET_KEY").unwrap_err();
        assert!(err.to_string().contains("RAGRELAY_TEST_SURELY_UNSET_KEY"));
    }
}
