// =============================================================================
// Finnhub Client — Per-security fundamental metrics
// =============================================================================
//
// Fetches the `/stock/metric` payload for one ticker and maps the provider's
// field names onto the three domain factors the scoring engine consumes.
// The mapping lives in one table (`FIELD_MAP`) so a provider schema change
// touches exactly one place.
//
// Rate limiting: a 429 response triggers a bounded wait-and-retry loop.
// After `MAX_ATTEMPTS` the ticker is given up on and reported as absent —
// the pipeline skips it rather than stalling the whole run.

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, warn};

const BASE_URL: &str = "https://finnhub.io/api/v1";
/// Wait between attempts after a 429 response.
const RATE_LIMIT_WAIT: std::time::Duration = std::time::Duration::from_secs(30);
/// Total attempts per ticker, including the first.
const MAX_ATTEMPTS: u32 = 3;

// =============================================================================
// Provider-field → domain-field mapping
// =============================================================================

/// Domain factors extracted from the provider payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricField {
    ValuationRatio,
    OperatingMargin,
    RevenueGrowth,
}

/// Finnhub metric keys for each domain factor.  Trailing-twelve-month PE and
/// margin; quarterly YoY revenue growth to catch recent trends.
const FIELD_MAP: &[(MetricField, &str)] = &[
    (MetricField::ValuationRatio, "peBasicExclExtraTTM"),
    (MetricField::OperatingMargin, "operatingMarginTTM"),
    (MetricField::RevenueGrowth, "revenueGrowthQuarterlyYoy"),
];

// =============================================================================
// Types
// =============================================================================

/// Point-in-time fundamentals for one security.  Individual fields may be
/// null when the provider lacks coverage; a failed fetch produces no record
/// at all rather than a record of nulls.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityMetrics {
    pub ticker: String,
    /// PE multiple; only usable when positive.
    pub valuation_ratio: Option<f64>,
    /// Operating margin, percent.
    pub operating_margin: Option<f64>,
    /// Revenue growth, percent YoY.
    pub revenue_growth: Option<f64>,
}

/// Fetches fundamental metrics from the Finnhub API.
pub struct FinnhubClient {
    client: reqwest::Client,
    api_key: String,
}

impl FinnhubClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("failed to build reqwest client for FinnhubClient"),
            api_key: api_key.into(),
        }
    }

    /// Fetch fundamentals for `ticker`.
    ///
    /// `None` means the security contributes nothing to this run: HTTP
    /// failure, unparsable payload, or an unresolvable rate limit after the
    /// retry budget is spent.
    pub async fn fetch_metrics(&self, ticker: &str) -> Option<SecurityMetrics> {
        for attempt in 1..=MAX_ATTEMPTS {
            match self.try_fetch(ticker).await {
                Ok(FetchOutcome::Metrics(m)) => return Some(m),
                Ok(FetchOutcome::RateLimited) => {
                    if attempt == MAX_ATTEMPTS {
                        warn!(ticker, "rate limit persisted after {MAX_ATTEMPTS} attempts — skipping");
                        return None;
                    }
                    warn!(ticker, attempt, "rate limited — waiting before retry");
                    tokio::time::sleep(RATE_LIMIT_WAIT).await;
                }
                Ok(FetchOutcome::Unusable) => return None,
                Err(e) => {
                    debug!(ticker, error = %e, "metrics fetch failed — skipping");
                    return None;
                }
            }
        }
        None
    }

    async fn try_fetch(&self, ticker: &str) -> Result<FetchOutcome> {
        let url = format!("{BASE_URL}/stock/metric");
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("symbol", ticker),
                ("metric", "all"),
                ("token", self.api_key.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("GET metrics for {ticker}"))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Ok(FetchOutcome::RateLimited);
        }
        if !resp.status().is_success() {
            debug!(ticker, status = %resp.status(), "non-success metrics response");
            return Ok(FetchOutcome::Unusable);
        }

        let body: Value = resp
            .json()
            .await
            .context("failed to parse metrics response body")?;

        Ok(FetchOutcome::Metrics(metrics_from_payload(ticker, &body)))
    }
}

enum FetchOutcome {
    Metrics(SecurityMetrics),
    RateLimited,
    Unusable,
}

/// Extract the domain factors from a `/stock/metric` payload via `FIELD_MAP`.
fn metrics_from_payload(ticker: &str, body: &Value) -> SecurityMetrics {
    let metric = &body["metric"];
    let get = |field: MetricField| -> Option<f64> {
        let (_, key) = FIELD_MAP.iter().find(|(f, _)| *f == field)?;
        metric.get(*key)?.as_f64().filter(|v| v.is_finite())
    };

    SecurityMetrics {
        ticker: ticker.to_string(),
        valuation_ratio: get(MetricField::ValuationRatio),
        operating_margin: get(MetricField::OperatingMargin),
        revenue_growth: get(MetricField::RevenueGrowth),
    }
}
