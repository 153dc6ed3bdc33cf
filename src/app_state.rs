// =============================================================================
// Central Application State — Pipeline result cell
// =============================================================================
//
// The single piece of shared state in the process: the latest (and only)
// pipeline result.  The background pipeline writes it exactly once; the
// dashboard handler reads it on every request.
//
// Thread safety:
//   - parking_lot::RwLock around an Option<Arc<PipelineResult>>.
//   - The result is immutable after publish, so readers clone the Arc and
//     drop the lock immediately; "not ready" is simply `None`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::regime::RegimeSnapshot;
use crate::scoring::ScoredSecurity;

/// The complete output of one pipeline run.  Built off to the side and
/// published in a single assignment, so readers never observe a partially
/// populated result.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub regime: RegimeSnapshot,
    pub strategy_note: String,
    /// Highest composite scores first.
    pub long_candidates: Vec<ScoredSecurity>,
    /// Lowest composite score first.
    pub short_candidates: Vec<ScoredSecurity>,
    pub computed_at: DateTime<Utc>,
}

/// Shared across all tasks via `Arc<AppState>`.
#[derive(Default)]
pub struct AppState {
    result: RwLock<Option<Arc<PipelineResult>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace the held result.  Called once per process
    /// lifetime, when the pipeline completes.
    pub fn publish(&self, result: PipelineResult) {
        *self.result.write() = Some(Arc::new(result));
    }

    /// Latest published result, or `None` while the pipeline is still
    /// running (or has aborted).  Never blocks readers for long: the lock is
    /// held only for the Arc clone.
    pub fn latest(&self) -> Option<Arc<PipelineResult>> {
        self.result.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.result.read().is_some()
    }
}
