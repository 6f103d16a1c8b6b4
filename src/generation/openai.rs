//! Chat completions against any OpenAI-compatible API.

use super::{Generator, TextStream};
use crate::config::{require_env, GenerationSettings};
use crate::error::{RelayError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, instrument};

/// Streaming generator over the chat completions endpoint.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl OpenAIGenerator {
    /// Create a generator for `model` served at `api_base`.
    pub fn new(model: &str, api_base: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: create_client(Some(api_base), api_key, timeout)?,
            model: model.to_string(),
            temperature: None,
        })
    }

    /// Create a generator from the `[generation]` settings, reading its key from the environment.
    pub fn from_settings(settings: &GenerationSettings) -> Result<Self> {
        let api_key = require_env(&settings.api_key_env)?;
        let mut generator = Self::new(
            &settings.model,
            &settings.api_base,
            &api_key,
            Duration::from_secs(settings.timeout_seconds),
        )?;
        generator.temperature = settings.temperature;
        Ok(generator)
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    #[instrument(skip(self, system_prompt, user_prompt), fields(model = %self.model))]
    async fn complete_stream(&self, system_prompt: &str, user_prompt: &str) -> Result<TextStream> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(|e| RelayError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| RelayError::Generation(e.to_string()))?
                .into(),
        ];

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model).messages(messages).stream(true);
        if let Some(temperature) = self.temperature {
            args.temperature(temperature);
        }
        let request = args
            .build()
            .map_err(|e| RelayError::Generation(e.to_string()))?;

        debug!("Requesting streamed completion ({} prompt chars)", user_prompt.len());

        let stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| RelayError::OpenAI(format!("Failed to start completion: {}", e)))?;

        let segments = stream.map(|item| match item {
            Ok(chunk) => Ok(chunk
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content)
                .unwrap_or_default()),
            Err(e) => Err(RelayError::Generation(format!("Completion stream error: {}", e))),
        });

        Ok(Box::pin(segments))
    }
}
