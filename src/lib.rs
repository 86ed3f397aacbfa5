pub mod accounts;
pub mod api;
pub mod app;
pub mod calendar;
pub mod config;
pub mod db;
pub mod errors;
pub mod keys;
pub mod logs;
pub mod models;
pub mod roster;
pub mod service;

use crate::app::{build_router, AppState};
use crate::config::RosterConfig;
use crate::service::RosterService;
use anyhow::Context;
use std::future::Future;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

pub async fn run(config: RosterConfig) -> anyhow::Result<()> {
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

pub async fn run_with_shutdown<F>(config: RosterConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Err(error) = init_tracing(config.log_dir.as_deref()) {
        eprintln!("tracing already initialised: {error}");
    }

    let service = RosterService::open(&config.data_file, &config.default_password);
    let app = build_router(AppState { service });

    let addr = config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(%addr, "roster service listening");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
        .context("serve http")?;
    tracing::info!("roster service stopped");
    Ok(())
}

/// JSON lines to a daily rolling file when `log_dir` is set, plain text to
/// stdout otherwise.
pub fn init_tracing(log_dir: Option<&Path>) -> anyhow::Result<()> {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    match log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)
                .with_context(|| format!("create log dir {}", log_dir.display()))?;
            let file_appender = tracing_appender::rolling::daily(log_dir, "escala.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let _ = LOG_GUARD.set(guard);

            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .json()
                .with_writer(non_blocking)
                .try_init()
                .map_err(|error| anyhow::anyhow!(error))
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter())
            .try_init()
            .map_err(|error| anyhow::anyhow!(error)),
    }
}
