// =============================================================================
// Analysis Pipeline — One-shot background run
// =============================================================================
//
// Runs exactly once per process lifetime, on a detached task spawned from
// `main`.  Order of operations:
//
//   1. Credential gate (both provider keys required).
//   2. Macro regime from the two FRED series — fatal if unavailable.
//   3. Universe scrape, truncated to the fetch limit.
//   4. Sequential per-ticker fundamentals fetch, throttled between calls.
//   5. Scoring, then a single atomic publish into AppState.
//
// Fatal conditions are logged and the task returns: the result cell stays
// empty and the dashboard keeps its loading card.  That indefinite loading
// state is the only user-visible failure mode.

use std::sync::Arc;

use tracing::{error, info};

use crate::app_state::{AppState, PipelineResult};
use crate::config::Config;
use crate::errors::PipelineError;
use crate::providers::finnhub::{FinnhubClient, SecurityMetrics};
use crate::providers::fred::{FredClient, SERIES_BALANCE_SHEET, SERIES_FED_FUNDS};
use crate::providers::universe;
use crate::regime;
use crate::scoring;

/// Pause after every fundamentals request.  The provider's free tier bans
/// aggressive callers, so this delay is a correctness requirement: any
/// parallelization must replace it with a limiter bounding the aggregate
/// rate, not drop it.
const FETCH_THROTTLE: std::time::Duration = std::time::Duration::from_millis(1100);
/// Log fetch progress every this many tickers.
const PROGRESS_INTERVAL: usize = 25;

/// Entry point for the detached pipeline task.
pub async fn run(config: Config, state: Arc<AppState>) {
    info!("starting z-score strategy analysis");
    if let Err(e) = try_run(&config, &state).await {
        error!(error = %e, "analysis run aborted — dashboard will stay in loading state");
    }
}

async fn try_run(config: &Config, state: &AppState) -> Result<(), PipelineError> {
    config.require_credentials()?;

    // ── Macro regime ─────────────────────────────────────────────────────
    let fred = FredClient::new(config.fred_api_key.clone());
    let rate_series = fred.fetch_series(SERIES_FED_FUNDS).await;
    let balance_sheet_series = fred.fetch_series(SERIES_BALANCE_SHEET).await;

    let snapshot = regime::classify(&rate_series, &balance_sheet_series)?;
    info!(
        regime = %snapshot.regime,
        description = snapshot.regime.description(),
        as_of = %snapshot.as_of,
        "macro regime classified"
    );

    // ── Fundamentals panel ───────────────────────────────────────────────
    let finnhub = FinnhubClient::new(config.finnhub_api_key.clone());
    let shared_http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("failed to build reqwest client for universe fetch");

    let mut tickers = universe::fetch_sp500_tickers(&shared_http).await;
    tickers.truncate(config.stock_fetch_limit);
    info!(count = tickers.len(), "fetching fundamentals for universe");

    let mut panel: Vec<SecurityMetrics> = Vec::with_capacity(tickers.len());
    for (i, ticker) in tickers.iter().enumerate() {
        if i % PROGRESS_INTERVAL == 0 {
            info!(done = i, total = tickers.len(), "fundamentals fetch progress");
        }
        if let Some(metrics) = finnhub.fetch_metrics(ticker).await {
            panel.push(metrics);
        }
        tokio::time::sleep(FETCH_THROTTLE).await;
    }
    info!(fetched = panel.len(), of = tickers.len(), "fundamentals panel assembled");

    // ── Scoring & publish ────────────────────────────────────────────────
    let ranking = scoring::score(&panel, snapshot.regime, config.top_n)?;

    let result = PipelineResult {
        regime: snapshot,
        strategy_note: ranking.strategy_note,
        long_candidates: ranking.long_candidates,
        short_candidates: ranking.short_candidates,
        computed_at: chrono::Utc::now(),
    };

    info!(
        longs = result.long_candidates.len(),
        shorts = result.short_candidates.len(),
        "analysis complete — publishing result"
    );
    state.publish(result);

    Ok(())
}
