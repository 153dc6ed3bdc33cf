// =============================================================================
// Process Configuration — Environment-driven settings
// =============================================================================
//
// All settings come from the environment (optionally via a `.env` file).
// The two API keys are required for the pipeline to run; everything else has
// a sensible default.
//
//   FRED_API_KEY        economic-data provider key (required)
//   FINNHUB_API_KEY     security-metrics provider key (required)
//   STOCK_FETCH_LIMIT   max securities evaluated per run (default 500)
//   TOP_N_SELECTION     long/short slots reported      (default 15)
//   PORT                HTTP listen port               (default 5000)

use crate::errors::PipelineError;

/// Default universe truncation: roughly the full S&P 500.
const DEFAULT_STOCK_FETCH_LIMIT: usize = 500;
/// Default number of long and short slots on the dashboard.
const DEFAULT_TOP_N: usize = 15;
const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone)]
pub struct Config {
    pub fred_api_key: String,
    pub finnhub_api_key: String,
    /// Universe is truncated to this many tickers before fetching.
    pub stock_fetch_limit: usize,
    /// Number of long candidates and short candidates to report.
    pub top_n: usize,
    pub port: u16,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// Missing keys yield empty strings here; `require_credentials` is the
    /// gate the pipeline calls before doing any work.
    pub fn from_env() -> Self {
        Self {
            fred_api_key: std::env::var("FRED_API_KEY").unwrap_or_default(),
            finnhub_api_key: std::env::var("FINNHUB_API_KEY").unwrap_or_default(),
            stock_fetch_limit: env_parse("STOCK_FETCH_LIMIT", DEFAULT_STOCK_FETCH_LIMIT),
            top_n: env_parse("TOP_N_SELECTION", DEFAULT_TOP_N).max(1),
            port: env_parse("PORT", DEFAULT_PORT),
        }
    }

    /// Refuse to run without both provider keys.
    pub fn require_credentials(&self) -> Result<(), PipelineError> {
        if self.fred_api_key.is_empty() {
            return Err(PipelineError::MissingCredentials("FRED_API_KEY"));
        }
        if self.finnhub_api_key.is_empty() {
            return Err(PipelineError::MissingCredentials("FINNHUB_API_KEY"));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_are_rejected() {
        let cfg = Config {
            fred_api_key: String::new(),
            finnhub_api_key: "x".into(),
            stock_fetch_limit: 50,
            top_n: 15,
            port: 5000,
        };
        assert_eq!(
            cfg.require_credentials(),
            Err(PipelineError::MissingCredentials("FRED_API_KEY"))
        );

        let cfg = Config {
            fred_api_key: "x".into(),
            finnhub_api_key: String::new(),
            ..cfg
        };
        assert_eq!(
            cfg.require_credentials(),
            Err(PipelineError::MissingCredentials("FINNHUB_API_KEY"))
        );
    }

    #[test]
    fn both_keys_present_pass() {
        let cfg = Config {
            fred_api_key: "a".into(),
            finnhub_api_key: "b".into(),
            stock_fetch_limit: 500,
            top_n: 15,
            port: 5000,
        };
        assert!(cfg.require_credentials().is_ok());
    }
}
