//! OpenAI-compatible client configuration with sensible defaults.

use crate::error::{RelayError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create a client for an OpenAI-compatible API.
///
/// `api_base` may point at OpenAI itself or at a compatible router such as
/// OpenRouter. `None` keeps the async-openai default base.
pub fn create_client(
    api_base: Option<&str>,
    api_key: &str,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RelayError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = api_base {
        config = config.with_api_base(base.trim_end_matches('/'));
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Create a client with the default timeout.
pub fn create_default_client(api_base: Option<&str>, api_key: &str) -> Result<Client<OpenAIConfig>> {
    create_client(api_base, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}
