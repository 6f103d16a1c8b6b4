//! Streaming text generation.

mod openai;

pub use openai::OpenAIGenerator;

use crate::error::Result;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// A lazy, finite, non-restartable sequence of text segments.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Trait for completion backends that produce incremental output.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Start a completion and return its segments in arrival order.
    ///
    /// Errors returned here mean the completion never started; errors
    /// yielded by the stream mean it failed part-way.
    async fn complete_stream(&self, system_prompt: &str, user_prompt: &str) -> Result<TextStream>;
}
