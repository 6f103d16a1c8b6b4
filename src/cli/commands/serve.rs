//! Serve command: run the relay server.

use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::relay::RagRelay;
use crate::server::{self, AppState};
use std::sync::Arc;

/// Run the relay server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(&settings) {
        Output::error(&e.to_string());
        Output::info("Run 'ragrelay doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let relay = RagRelay::from_settings(&settings).await?;
    let state = Arc::new(AppState::new(relay));

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);

    Output::header("ragrelay");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Answer", "POST /rag");
    Output::kv("Stream", "POST /stream_rag");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    server::serve(&addr, state).await
}
