//! Chatbot - terminal chat client
//!
//! Sends each submission to a remote inference endpoint and keeps the
//! conversation transcript in step with the replies.

mod config;
mod db;
mod llm;
mod preferences;
mod runtime;
mod state_machine;
mod transcript;
mod tui;

use config::ClientConfig;
use db::Database;
use llm::{HttpChatService, LoggingService};
use preferences::{DisplayPreferences, MemoryPreferences, PreferenceStore};
use runtime::ChatSession;
use state_machine::DispatchContext;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;

    init_logging(&config.log_path)?;
    tracing::info!(
        endpoint = %config.endpoint,
        timeout_secs = config.timeout.as_secs(),
        policy = ?config.dispatch_policy,
        "Starting chatbot"
    );

    let preferences = DisplayPreferences::load(open_preferences(&config.prefs_path));

    let http = HttpChatService::new(config.endpoint.clone(), config.timeout)?;
    let service = LoggingService::new(Arc::new(http));
    let session = ChatSession::new(DispatchContext::new(config.dispatch_policy), service);
    let mut app = tui::App::new(session, preferences);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = tui::run(&mut terminal, &mut app).await;
    tui::restore()?;
    result?;

    tracing::info!("Chatbot exited");
    Ok(())
}

/// The TUI owns the terminal, so logs go to a file
fn init_logging(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatbot=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

/// SQLite store, or an in-memory one for this session if it can't be opened
fn open_preferences(path: &Path) -> Box<dyn PreferenceStore> {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!(path = %parent.display(), error = %e, "Failed to create preferences directory");
        }
    }

    tracing::info!(path = %path.display(), "Opening preferences database");
    match Database::open(path) {
        Ok(db) => Box::new(db),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Preferences database unavailable, keeping preferences in memory"
            );
            Box::new(MemoryPreferences::new())
        }
    }
}
