//! Interactive chat command.

use super::ask::client_for;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Speaker of a transcript entry.
#[derive(Debug, Clone, PartialEq)]
enum Role {
    User,
    Assistant,
}

/// Run the interactive chat command.
pub async fn run_chat(url: Option<String>, settings: Settings) -> Result<()> {
    let client = client_for(url, &settings)?;
    let mut transcript: Vec<(Role, String)> = Vec::new();

    println!("\n{}", style("ragrelay chat").bold().cyan());
    println!(
        "{}\n",
        style("Type your questions, or 'exit' to quit. Use 'clear' to reset the transcript.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            transcript.clear();
            Output::info("Transcript cleared.");
            continue;
        }

        transcript.push((Role::User, input.to_string()));

        print!("\n{} ", style("Assistant:").cyan().bold());
        stdout.flush()?;

        let mut out = io::stdout();
        let result = client
            .ask_streaming(input, |fragment| {
                let _ = write!(out, "{}", fragment);
                let _ = out.flush();
            })
            .await;

        match result {
            Ok(answer) => {
                println!("\n");
                transcript.push((Role::Assistant, answer));
            }
            Err(e) => {
                println!();
                Output::error(&format!("An error occurred while processing your request: {}", e));
                transcript.push((
                    Role::Assistant,
                    "An error occurred while processing your request.".to_string(),
                ));
            }
        }
    }

    let exchanges = transcript.iter().filter(|(role, _)| *role == Role::User).count();
    if exchanges > 0 {
        Output::kv("Questions asked", &exchanges.to_string());
    }

    Ok(())
}
