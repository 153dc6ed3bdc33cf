// =============================================================================
// FRED Client — Macro time-series observations
// =============================================================================
//
// Fetches historical observations for a FRED series id (e.g. FEDFUNDS,
// WALCL).  Ten years of history are requested so the 5-year rolling average
// always has enough runway.
//
// FRED encodes missing observations as the literal string "." — those rows
// are dropped during parsing rather than surfaced as NaN.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
/// How far back to request observations (10 years).
const HISTORY_DAYS: i64 = 365 * 10;
/// FRED's missing-value sentinel.
const MISSING_SENTINEL: &str = ".";

/// Effective federal funds rate, monthly.
pub const SERIES_FED_FUNDS: &str = "FEDFUNDS";
/// Fed balance-sheet total assets, weekly.
pub const SERIES_BALANCE_SHEET: &str = "WALCL";

/// One observation of a macro series.  Sequences are strictly increasing by
/// date and immutable once fetched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

/// Fetches observation history from the FRED API.
pub struct FredClient {
    client: reqwest::Client,
    api_key: String,
}

impl FredClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("failed to build reqwest client for FredClient"),
            api_key: api_key.into(),
        }
    }

    /// Fetch the full trailing history for `series_id`.
    ///
    /// Any failure (network, HTTP error, unparsable body) is logged and
    /// yields an empty vec — the caller treats an empty series as
    /// unavailable data, there is nothing to recover per-call.
    pub async fn fetch_series(&self, series_id: &str) -> Vec<TimeSeriesPoint> {
        match self.try_fetch_series(series_id).await {
            Ok(points) => {
                debug!(series = series_id, points = points.len(), "FRED series fetched");
                points
            }
            Err(e) => {
                warn!(series = series_id, error = %e, "FRED fetch failed — treating series as empty");
                Vec::new()
            }
        }
    }

    async fn try_fetch_series(&self, series_id: &str) -> Result<Vec<TimeSeriesPoint>> {
        let observation_start =
            (chrono::Utc::now().date_naive() - chrono::Duration::days(HISTORY_DAYS))
                .format("%Y-%m-%d")
                .to_string();

        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("observation_start", observation_start.as_str()),
                ("sort_order", "asc"),
            ])
            .send()
            .await
            .with_context(|| format!("GET FRED observations for {series_id}"))?
            .error_for_status()
            .with_context(|| format!("FRED returned an error status for {series_id}"))?;

        let body: ObservationsResponse = resp
            .json()
            .await
            .context("failed to parse FRED observations body")?;

        Ok(parse_observations(body))
    }
}

/// Convert raw observations into a clean, date-ordered series.
///
/// Drops the "." missing-value sentinel and anything unparsable.  The API is
/// asked for ascending order but the sort is enforced here anyway since the
/// classifier's backward join depends on it.
fn parse_observations(body: ObservationsResponse) -> Vec<TimeSeriesPoint> {
    let mut points: Vec<TimeSeriesPoint> = body
        .observations
        .into_iter()
        .filter(|obs| obs.value != MISSING_SENTINEL)
        .filter_map(|obs| {
            let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").ok()?;
            let value: f64 = obs.value.trim().parse().ok()?;
            value.is_finite().then_some(TimeSeriesPoint { date, value })
        })
        .collect();

    points.sort_by_key(|p| p.date);
    points.dedup_by_key(|p| p.date);
    points
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> ObservationsResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_ordinary_observations() {
        let points = parse_observations(body(
            r#"{"observations":[
                {"date":"2024-01-01","value":"5.33"},
                {"date":"2024-02-01","value":"5.33"}
            ]}"#,
        ));
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!((points[0].value - 5.33).abs() < 1e-12);
    }

    #[test]
    fn skips_missing_value_sentinel() {
        let points = parse_observations(body(
            r#"{"observations":[
                {"date":"2024-01-01","value":"."},
                {"date":"2024-02-01","value":"5.33"}
            ]}"#,
        ));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }

    #[test]
    fn skips_unparsable_rows() {
        let points = parse_observations(body(
            r#"{"observations":[
                {"date":"not-a-date","value":"1.0"},
                {"date":"2024-02-01","value":"abc"},
                {"date":"2024-03-01","value":"7.1"}
            ]}"#,
        ));
        assert_eq!(points.len(), 1);
        assert!((points[0].value - 7.1).abs() < 1e-12);
    }

    #[test]
    fn enforces_ascending_order_and_unique_dates() {
        let points = parse_observations(body(
            r#"{"observations":[
                {"date":"2024-03-01","value":"3.0"},
                {"date":"2024-01-01","value":"1.0"},
                {"date":"2024-03-01","value":"3.5"}
            ]}"#,
        ));
        assert_eq!(points.len(), 2);
        assert!(points[0].date < points[1].date);
    }

    #[test]
    fn empty_body_is_empty_series() {
        assert!(parse_observations(body(r#"{"observations":[]}"#)).is_empty());
        assert!(parse_observations(body(r#"{}"#)).is_empty());
    }
}
