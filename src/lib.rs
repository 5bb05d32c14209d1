pub mod backend;
pub mod config;
pub mod conversation;
pub mod logging;
pub mod model;
pub mod providers;
pub mod repl;
pub mod router;
pub mod transcript;

use anyhow::{Context, Result};
use reqwest::Client;
use std::env;
use std::time::Duration;
use tracing::error;

use config::Config;
use repl::run_repl;

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = logging::init();

    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!(error = %err, "startup configuration is invalid");
            return Err(err.into());
        }
    };

    let client = Client::builder()
        .timeout(Duration::from_secs(cfg.model_timeout_secs))
        .build()
        .context("Failed to initialize HTTP client")?;

    // Positional args, if any, are the session role label.
    let args: Vec<String> = env::args().skip(1).collect();
    let role_arg = if args.is_empty() {
        None
    } else {
        Some(args.join(" "))
    };

    run_repl(&client, &cfg, role_arg).await
}
