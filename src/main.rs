//! AsthmaCare: asthma severity assessment service
//!
//! Reads one JSON request per stdin line and writes one JSON response per
//! stdout line.

use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use asthmacare::adapters::classifier::load_or_unavailable;
use asthmacare::adapters::sanitize::SanitizingMakeWriter;
use asthmacare::adapters::sessions::MemorySessionStore;
use asthmacare::adapters::sqlite::SqliteStorage;
use asthmacare::api::Api;
use asthmacare::application::{AccountService, PredictionService, SeverityEngine};
use asthmacare::config::{AppConfig, LogMode};

fn main() -> Result<()> {
    let config = AppConfig::from_env();

    // Initialize logging.
    //
    // stdout carries responses, so logs never go there.
    // - interactive TTY: log to a file
    // - piped: log to stderr
    let use_file = match config.log_mode {
        LogMode::File => true,
        LogMode::Stderr => false,
        LogMode::Auto => std::io::stdin().is_terminal(),
    };

    let (writer, _guard) = if use_file {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: don't fail startup just because the directory is missing.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)
            .with_context(|| format!("Cannot open log file {}", config.log_file.display()))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    tracing::info!("Starting AsthmaCare...");

    let opened = if config.in_memory_db() {
        tracing::warn!("Using in-memory database; history is lost on exit");
        SqliteStorage::in_memory()
    } else {
        SqliteStorage::new(&config.db_path)
    };
    let storage = Arc::new(opened.with_context(|| format!("Cannot open database {}", config.db_path))?);

    let classifier = load_or_unavailable(&config.model_path, config.model_sha256.as_deref());
    let engine = SeverityEngine::new(classifier);
    let sessions = Arc::new(MemorySessionStore::new(config.session_ttl));

    let api = Api::new(
        PredictionService::new(engine, storage.clone()),
        AccountService::new(storage, sessions, config.admin_user.clone()),
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let handled = api.serve(stdin.lock(), stdout.lock())?;

    tracing::info!("AsthmaCare shutdown complete ({} requests handled).", handled);
    Ok(())
}
