// =============================================================================
// Data Providers Module
// =============================================================================
//
// Thin HTTP clients for the three upstream sources:
// - FRED (macro time series for the regime classifier)
// - Finnhub (per-security fundamentals for the scoring engine)
// - Wikipedia (S&P 500 constituents list)
//
// Providers absorb their own failures: an unusable series comes back empty,
// unusable metrics come back as `None`.  Only the pipeline decides whether a
// degraded input is fatal.

pub mod finnhub;
pub mod fred;
pub mod universe;

pub use finnhub::{FinnhubClient, SecurityMetrics};
pub use fred::{FredClient, TimeSeriesPoint};
