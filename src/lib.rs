//! ragrelay - streaming retrieval-augmented answers
//!
//! A relay server that answers questions from a vector-indexed knowledge
//! base, streaming language-model output to the caller and caching
//! finished answers, plus a client for talking to it.
//!
//! # Overview
//!
//! For each query the relay:
//! - Returns a cached answer verbatim if one exists
//! - Otherwise embeds the query and fetches the nearest passages
//! - Wraps the passages and the query in a fixed prompt template
//! - Streams the completion to the caller segment by segment
//! - Caches the full text once the completion finishes cleanly
//!
//! # Architecture
//!
//! - `config` - Settings, prompt text and startup secrets
//! - `cache` - TTL answer cache
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector index abstraction
//! - `generation` - Streaming completions
//! - `rag` - Retrieval and prompt assembly
//! - `relay` - The streaming relay and its per-request sessions
//! - `server` - HTTP routes over the relay
//! - `client` - Streaming HTTP client with incremental UTF-8 decoding
//!
//! # Example
//!
//! ```rust,no_run
//! use ragrelay::client::StreamingClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = StreamingClient::new("http://127.0.0.1:8000")?;
//!
//!     let answer = client
//!         .ask_streaming("Who teaches intro physics well?", |chunk| print!("{}", chunk))
//!         .await?;
//!     println!("\n{} chars", answer.len());
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod openai;
pub mod rag;
pub mod relay;
pub mod server;
pub mod vector_store;

pub use error::{RelayError, Result};
