//! Configuration module for ragrelay.
//!
//! Handles loading settings, prompt text, and startup secrets.

pub mod prompts;
mod settings;

pub use settings::{
    require_env, CacheSettings, ClientSettings, EmbeddingProvider, EmbeddingSettings,
    GenerationSettings, PromptSettings, ServerSettings, Settings, VectorStoreProvider,
    VectorStoreSettings,
};
