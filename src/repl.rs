use anyhow::{Context, Result};
use reqwest::Client;
use std::io::{self, Write};
use tracing::warn;

use crate::backend::OpenAiBackend;
use crate::config::Config;
use crate::conversation::ConversationStore;
use crate::router::{self, Outcome};
use crate::transcript::TranscriptLog;

const DEFAULT_ROLE_LABEL: &str = "insurance professional";

pub async fn run_repl(client: &Client, cfg: &Config, role_arg: Option<String>) -> Result<()> {
    let backend = OpenAiBackend::new(client, cfg);
    let mut store = ConversationStore::new();
    let transcript = TranscriptLog::new(cfg.transcript_path.clone());

    println!("========================================");
    println!("       Your Insurance AI Helper");
    println!("========================================");
    println!("model: {}", cfg.model);

    let role_label = match role_arg {
        Some(role) => role,
        None => prompt_role()?,
    };
    println!("\nWelcome! Type 'help' for quick commands or 'exit' to quit.\n");

    loop {
        print!("Ask the Insurance Bot (or type 'exit' to quit): ");
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut input = String::new();
        let read = io::stdin()
            .read_line(&mut input)
            .context("Failed to read stdin")?;
        if read == 0 {
            break;
        }

        match router::handle(&backend, &mut store, &role_label, &input).await {
            Ok(Outcome::Exit) => {
                println!("\nThank you for using the Insurance AI Helper. Goodbye!");
                break;
            }
            Ok(Outcome::CannedReply(text)) => {
                println!("\nBot: {text}\n");
            }
            Ok(Outcome::DelegatedReply(text)) => {
                println!("\nBot: {}\n", text.trim());
                if let Err(err) = transcript.append_exchange(input.trim(), text.trim()) {
                    warn!(
                        path = %transcript.path().display(),
                        error = %err,
                        "failed to append to session transcript"
                    );
                }
            }
            Err(remote) => {
                // Exchange abandoned, store untouched; keep the session alive.
                warn!(kind = ?remote.kind, detail = %remote.detail, "model exchange failed");
                eprintln!("\nAn error occurred: {}", remote.detail);
                eprintln!("→ {}\n", remote.kind.hint());
            }
        }
    }

    Ok(())
}

fn prompt_role() -> Result<String> {
    print!("\nEnter your role (e.g., 'claims adjuster', 'agent', 'customer support'): ");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Failed to read stdin")?;

    let role = input.trim();
    if role.is_empty() {
        Ok(DEFAULT_ROLE_LABEL.to_string())
    } else {
        Ok(role.to_string())
    }
}
