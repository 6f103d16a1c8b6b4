//! Response cache for completed answers.
//!
//! The cache is an injected service: it is built once at startup and handed
//! to the relay, which is its only reader and writer.

mod memory;

pub use memory::MemoryResponseCache;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Trait for answer caches keyed by the exact query string.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Look up a non-expired answer.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store an answer that expires `ttl` after insertion.
    ///
    /// Writing an existing key replaces the value and restarts its lifetime.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;
}
