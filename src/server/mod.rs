//! HTTP relay server.
//!
//! Routes:
//! - `POST /stream_rag` answers as chunked `text/plain`, or as one body on a cache hit
//! - `POST /rag` answers as `{ "response": ... }`
//! - `GET /health`

use crate::client::{AnswerResponse, QueryRequest, ANSWER_ROUTE, STREAM_ROUTE};
use crate::error::RelayError;
use crate::relay::{RagRelay, RelayReply};
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Shared application state.
pub struct AppState {
    relay: RagRelay,
}

impl AppState {
    pub fn new(relay: RagRelay) -> Self {
        Self { relay }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

/// Build the relay router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route(&format!("/{}", ANSWER_ROUTE), post(answer))
        .route(&format!("/{}", STREAM_ROUTE), post(stream_answer))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve `state` on `addr` until Ctrl+C.
pub async fn serve(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Relay listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Reject bodies the JSON extractor could not parse, before any upstream call.
fn parse_query(payload: Result<Json<QueryRequest>, JsonRejection>) -> Result<String, RelayError> {
    payload
        .map(|Json(req)| req.query)
        .map_err(|rejection| RelayError::InvalidInput(rejection.body_text()))
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn answer(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, RelayError> {
    let query = parse_query(payload)?;
    let response = state.relay.answer(&query).await?;
    Ok(Json(AnswerResponse { response }))
}

async fn stream_answer(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Response, RelayError> {
    let query = parse_query(payload)?;

    let response = match state.relay.respond(&query).await? {
        // A String body carries Content-Length, so cached answers are not chunked.
        RelayReply::Cached(text) => ([(header::CONTENT_TYPE, TEXT_PLAIN)], text).into_response(),
        // An `Err` item aborts the body mid-flight.
        RelayReply::Streaming(segments) => (
            [(header::CONTENT_TYPE, TEXT_PLAIN)],
            Body::from_stream(segments),
        )
            .into_response(),
    };

    Ok(response)
}
