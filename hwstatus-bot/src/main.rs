//! Homework Status Bot
//!
//! Watches the review status of a homework submission and reports every
//! change to a Telegram chat.
//!
//! Architecture:
//! - Configuration: Load credentials and intervals from the environment
//! - Clients: HTTP communication with the status API and the Bot API
//! - Services: Seams between the poller and the clients
//! - Scheduler: The poll loop with change detection and failure recovery

mod config;
mod scheduler;
mod service;

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::scheduler::StatusPoller;
use hwstatus_client::{PracticumClient, TelegramClient, http_client};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine, the variables may come from the environment
    let dotenv = dotenvy::dotenv();

    let config = Config::from_env();
    init_logging(&config.log_file)?;

    info!("Starting homework status bot");
    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    if !config.check_tokens() {
        error!("Required credentials are missing, stopping");
        anyhow::bail!("missing required environment variables");
    }
    config.validate().context("Invalid configuration")?;
    info!("Loaded configuration: {:?}", config);

    let http = http_client(config.http_timeout).context("Failed to build HTTP client")?;
    let practicum = PracticumClient::with_client(
        config.practicum_endpoint.clone(),
        config.practicum_token.clone(),
        http.clone(),
    );
    let telegram = TelegramClient::with_client(
        config.telegram_api_url.clone(),
        config.telegram_token.clone(),
        config.telegram_chat_id.clone(),
        http,
    );

    info!("Clients initialized");

    let mut poller = StatusPoller::new(&config, Arc::new(practicum), Arc::new(telegram));

    poller.run().await;

    Ok(())
}

/// Logs to stdout and appends plain-text lines to `log_file`
fn init_logging(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hwstatus_bot=debug,hwstatus_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();

    Ok(())
}
