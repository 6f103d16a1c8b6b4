//! HTTP client for a running relay server.
//!
//! [`StreamingClient::call`] posts a query and either reads the whole JSON
//! answer at once or, when given a callback, decodes the chunked body as it
//! arrives and reports each fragment.

mod decoder;

pub use decoder::Utf8Decoder;

use crate::config::ClientSettings;
use crate::error::{RelayError, Result};
use crate::openai::DEFAULT_TIMEOUT_SECS;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Route returning `{ "response": ... }` in one piece.
pub const ANSWER_ROUTE: &str = "rag";
/// Route returning the answer as a chunked text body.
pub const STREAM_ROUTE: &str = "stream_rag";

/// Request body shared by both routes.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

/// Body of the non-streaming route.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub response: String,
}

/// Callback invoked with each decoded fragment of a streamed answer.
pub type ChunkCallback<'a> = &'a mut (dyn FnMut(&str) + Send);

/// Client for the relay's HTTP routes.
#[derive(Debug, Clone)]
pub struct StreamingClient {
    http: reqwest::Client,
    base_url: Url,
}

impl StreamingClient {
    /// Create a client for the server at `base_url` with the default timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        // A trailing slash keeps any base path when joining routes.
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };

        Ok(Self { http, base_url })
    }

    /// Create a client from the `[client]` settings section.
    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        Self::with_timeout(&settings.base_url, Duration::from_secs(settings.timeout_seconds))
    }

    /// Base URL routes are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Ask `query` and return the full answer.
    ///
    /// With a callback the answer is streamed and every decoded fragment is
    /// passed to it before being appended to the returned text. Without one
    /// a single request/response exchange is made.
    pub async fn call(&self, query: &str, on_chunk: Option<ChunkCallback<'_>>) -> Result<String> {
        match on_chunk {
            Some(callback) => self.ask_streaming(query, callback).await,
            None => self.ask(query).await,
        }
    }

    /// Ask `query` over the non-streaming route.
    #[instrument(skip(self))]
    pub async fn ask(&self, query: &str) -> Result<String> {
        let response = self.post(ANSWER_ROUTE, query).await?;
        let answer: AnswerResponse = response.json().await?;
        Ok(answer.response)
    }

    /// Ask `query` over the streaming route, reporting each fragment to `on_chunk`.
    #[instrument(skip(self, on_chunk))]
    pub async fn ask_streaming<F>(&self, query: &str, mut on_chunk: F) -> Result<String>
    where
        F: FnMut(&str) + Send,
    {
        let response = self.post(STREAM_ROUTE, query).await?;

        let mut body = response.bytes_stream();
        let mut decoder = Utf8Decoder::new();
        let mut full = String::new();

        while let Some(read) = body.next().await {
            let bytes = read.map_err(|e| RelayError::Stream(e.to_string()))?;
            let fragment = decoder.decode(&bytes);
            if !fragment.is_empty() {
                on_chunk(&fragment);
                full.push_str(&fragment);
            }
        }

        let tail = decoder.finish();
        if !tail.is_empty() {
            on_chunk(&tail);
            full.push_str(&tail);
        }

        debug!("Streamed answer complete ({} chars)", full.len());
        Ok(full)
    }

    /// POST the query and fail on a non-success status before touching the body.
    async fn post(&self, route: &str, query: &str) -> Result<reqwest::Response> {
        let url = self.base_url.join(route)?;
        let response = self
            .http
            .post(url)
            .json(&QueryRequest {
                query: query.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Status {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_base_url_keeps_path() {
        let client = StreamingClient::new("http://localhost:8000/api").unwrap();
        assert_eq!(
            client.base_url().join(STREAM_ROUTE).unwrap().as_str(),
            "http://localhost:8000/api/stream_rag"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(StreamingClient::new("not a url"), Err(RelayError::Url(_))));
    }

    #[tokio::test]
    async fn test_call_without_callback_uses_json_route() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rag"))
            .and(body_json(json!({ "query": "q" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "full answer" })))
            .expect(1)
            .mount(&server)
            .await;

        let client = StreamingClient::new(&server.uri()).unwrap();
        assert_eq!(client.call("q", None).await.unwrap(), "full answer");
    }

    #[tokio::test]
    async fn test_call_with_callback_streams() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/stream_rag"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Prof. Ada, 5★"))
            .mount(&server)
            .await;

        let client = StreamingClient::new(&server.uri()).unwrap();
        let mut seen = String::new();
        let mut on_chunk = |fragment: &str| seen.push_str(fragment);
        let full = client.call("q", Some(&mut on_chunk)).await.unwrap();

        assert_eq!(full, "Prof. Ada, 5★");
        assert_eq!(seen, full);
    }

    #[tokio::test]
    async fn test_error_status_fails_before_callback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "error": "Failed to generate response" })),
            )
            .mount(&server)
            .await;

        let client = StreamingClient::new(&server.uri()).unwrap();
        let mut calls = 0;
        let err = client
            .ask_streaming("q", |_| calls += 1)
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Status { status: 500, .. }));
        assert_eq!(calls, 0);

        let err = client.ask("q").await.unwrap_err();
        assert!(matches!(err, RelayError::Status { status: 500, .. }));
    }
}
