//! Pinecone vector index over its REST API.

use super::{Match, VectorIndex};
use crate::error::{RelayError, Result};
use crate::openai::DEFAULT_TIMEOUT_SECS;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Control-plane endpoint used to resolve an index's data-plane host.
const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
const API_VERSION: &str = "2024-07";

#[derive(Deserialize)]
struct DescribeIndexResponse {
    host: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    namespace: &'a str,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<Match>,
}

/// Handle to a single Pinecone index.
pub struct PineconeIndex {
    http: reqwest::Client,
    host: String,
    api_key: String,
}

impl PineconeIndex {
    /// Resolve the data-plane host of `index_name` and return a handle to it.
    pub async fn connect(index_name: &str, api_key: &str) -> Result<Self> {
        Self::connect_via(CONTROL_PLANE_URL, index_name, api_key).await
    }

    /// Like [`connect`](Self::connect), against a specific control-plane URL.
    pub async fn connect_via(control_plane: &str, index_name: &str, api_key: &str) -> Result<Self> {
        let http = build_http_client()?;
        let url = format!("{}/indexes/{}", control_plane.trim_end_matches('/'), index_name);

        let response = http
            .get(&url)
            .header("Api-Key", api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::VectorIndex(format!(
                "Failed to describe index '{}': HTTP {}: {}",
                index_name, status, body
            )));
        }

        let description: DescribeIndexResponse = response.json().await?;
        info!("Resolved Pinecone index '{}' at {}", index_name, description.host);

        Ok(Self {
            http,
            host: normalize_host(&description.host),
            api_key: api_key.to_string(),
        })
    }

    /// Create a handle for a known data-plane host.
    pub fn with_host(host: &str, api_key: &str) -> Result<Self> {
        Ok(Self {
            http: build_http_client()?,
            host: normalize_host(host),
            api_key: api_key.to_string(),
        })
    }

    /// Data-plane base URL.
    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    #[instrument(skip(self, vector), fields(dimensions = vector.len()))]
    async fn query(&self, vector: &[f32], top_k: usize, namespace: &str) -> Result<Vec<Match>> {
        let request = QueryRequest {
            vector,
            top_k,
            namespace,
            include_metadata: true,
            include_values: false,
        };

        let response = self
            .http
            .post(format!("{}/query", self.host))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::VectorIndex(format!("HTTP {}: {}", status, body)));
        }

        let mut result: QueryResponse = response.json().await?;
        result.matches.truncate(top_k);
        debug!("Pinecone returned {} matches", result.matches.len());

        Ok(result.matches)
    }
}

fn build_http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()?)
}

/// Hosts returned by the control plane carry no scheme.
fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_normalize_host() {
        assert_eq!(normalize_host("json-abc.svc.pinecone.io"), "https://json-abc.svc.pinecone.io");
        assert_eq!(normalize_host("http://localhost:5080/"), "http://localhost:5080");
    }

    #[tokio::test]
    async fn test_connect_resolves_host() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/indexes/json"))
            .and(header("Api-Key", "pc-test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "name": "json", "host": "json-abc.svc.pinecone.io" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let index = PineconeIndex::connect_via(&server.uri(), "json", "pc-test").await.unwrap();
        assert_eq!(index.host(), "https://json-abc.svc.pinecone.io");
    }

    #[tokio::test]
    async fn test_connect_unknown_index() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let err = PineconeIndex::connect_via(&server.uri(), "missing", "pc-test")
            .await
            .err()
            .unwrap();
        assert!(matches!(err, RelayError::VectorIndex(_)));
    }

    #[tokio::test]
    async fn test_query_sends_namespace_and_parses_matches() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(body_json(json!({
                "vector": [0.5, 0.5],
                "topK": 2,
                "namespace": "json-documents",
                "includeMetadata": true,
                "includeValues": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "namespace": "json-documents",
                "matches": [
                    { "id": "1", "score": 0.92, "metadata": { "text": "Prof. A" } },
                    { "id": "2", "score": 0.81, "metadata": { "text": "Prof. B" } }
                ]
            })))
            .mount(&server)
            .await;

        let index = PineconeIndex::with_host(&server.uri(), "pc-test").unwrap();
        let matches = index.query(&[0.5, 0.5], 2, "json-documents").await.unwrap();

        let texts: Vec<&str> = matches.iter().map(Match::text).collect();
        assert_eq!(texts, vec!["Prof. A", "Prof. B"]);
    }
}
