//! Ask command implementation.

use crate::cli::Output;
use crate::client::StreamingClient;
use crate::config::Settings;
use anyhow::Result;
use std::io::Write;

/// Build a client for `url`, falling back to the configured base URL.
pub(super) fn client_for(url: Option<String>, settings: &Settings) -> Result<StreamingClient> {
    let mut client_settings = settings.client.clone();
    if let Some(url) = url {
        client_settings.base_url = url;
    }
    Ok(StreamingClient::from_settings(&client_settings)?)
}

/// Run the ask command.
pub async fn run_ask(query: &str, no_stream: bool, url: Option<String>, settings: Settings) -> Result<()> {
    let client = client_for(url, &settings)?;
    let spinner = Output::spinner("Thinking...");

    let result = if no_stream {
        client.ask(query).await.map(|answer| {
            spinner.finish_and_clear();
            println!("\n{}\n", answer);
            answer
        })
    } else {
        let mut stdout = std::io::stdout();
        let mut first = true;
        let result = client
            .ask_streaming(query, |fragment| {
                if first {
                    spinner.finish_and_clear();
                    println!();
                    first = false;
                }
                print!("{}", fragment);
                let _ = stdout.flush();
            })
            .await;
        println!("\n");
        result
    };

    if let Err(e) = result {
        spinner.finish_and_clear();
        Output::error(&format!("Failed to get answer: {}", e));
        return Err(e.into());
    }

    Ok(())
}
