//! admin-console - terminal front end for the user and role management API.
//!
//! Keeps a session between invocations: the access token in the data
//! directory, the refresh token in the OS keychain.

mod cli;
mod commands;
mod terminal;

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use admin_console_core::{ApiClient, ApiError, AuthContext, Config};

use cli::Cli;
use commands::CommandContext;
use terminal::TerminalFeedback;

/// Log file name prefix inside the data directory's `logs/`
const LOG_FILE_PREFIX: &str = "admin-console";

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` controls the level (default `warn`). Logs go to stderr and,
/// when the log directory is usable, to a daily rolling file as well. The
/// returned guard flushes the file writer when dropped.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = fmt::layer().with_writer(io::stderr);

    let file_appender = log_dir.and_then(|dir| {
        std::fs::create_dir_all(dir).ok()?;
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .filename_suffix("log")
            .build(dir)
            .ok()
    });

    match file_appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    config.apply_env();
    if let Some(url) = cli.api_url.clone() {
        config.api_base_url = url;
    }

    let log_dir = config.data_dir().ok().map(|dir| dir.join("logs"));
    let log_guard = init_tracing(log_dir.as_deref());
    info!(api = %config.api_base_url, "admin-console starting");

    let credentials = config
        .credential_store()
        .context("Failed to open credential store")?;
    let auth = Arc::new(AuthContext::new(credentials));
    let client = ApiClient::from_config(&config, auth, Arc::new(TerminalFeedback))
        .context("Failed to create HTTP client")?;

    let mut ctx = CommandContext { client, config };
    let result = commands::run(cli.command, &mut ctx).await;

    if let Err(e) = result {
        match unreported_message(&e) {
            Some(message) => eprintln!("Error: {}", message),
            None => warn!(error = %e, "Command failed"),
        }
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}

/// Text to print for a failed command, or `None` when `TerminalFeedback`
/// already showed it. Errors raised before a request was sent or while
/// persisting tokens never reach the feedback.
fn unreported_message(err: &anyhow::Error) -> Option<String> {
    match err.downcast_ref::<ApiError>() {
        Some(ApiError::Storage(inner)) => Some(format!("{:#}", inner)),
        Some(e @ ApiError::InvalidRequest(_)) => Some(e.to_string()),
        Some(ApiError::IdentityFetch(cause)) if matches!(**cause, ApiError::SessionExpired) => {
            Some("Not logged in. Run `admin-console login` first.".to_string())
        }
        Some(_) => None,
        None => Some(format!("{:#}", err)),
    }
}
