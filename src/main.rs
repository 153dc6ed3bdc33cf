// =============================================================================
// Regime Radar — Main Entry Point
// =============================================================================
//
// Starts the HTTP dashboard immediately and kicks off the one-shot analysis
// pipeline on a detached task.  The page shows a loading card until the
// pipeline publishes its result; if the pipeline aborts (missing keys, bad
// upstream data) the page simply keeps loading — errors live in the logs.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod config;
mod errors;
mod pipeline;
mod providers;
mod regime;
mod scoring;
mod stats;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Regime Radar starting up");

    let config = Config::from_env();
    if let Err(e) = config.require_credentials() {
        // Not fatal to the process: the server still runs, the page just
        // never leaves its loading state.
        warn!(error = %e, "provider credentials missing — pipeline will not run");
    }
    info!(
        stock_fetch_limit = config.stock_fetch_limit,
        top_n = config.top_n,
        "configuration loaded"
    );

    // ── 2. Shared state ──────────────────────────────────────────────────
    let state = Arc::new(AppState::new());

    // ── 3. One-shot analysis pipeline ────────────────────────────────────
    let pipeline_state = state.clone();
    let pipeline_config = config.clone();
    tokio::spawn(async move {
        pipeline::run(pipeline_config, pipeline_state).await;
    });

    // ── 4. Dashboard server ──────────────────────────────────────────────
    let bind_addr = format!("0.0.0.0:{}", config.port);
    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "dashboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            warn!("shutdown signal received — stopping");
        })
        .await?;

    info!("Regime Radar shut down complete");
    Ok(())
}
