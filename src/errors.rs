// =============================================================================
// Pipeline Error Taxonomy
// =============================================================================
//
// Fatal conditions that abort the analysis run.  None of these reach the end
// user: the pipeline logs them and returns, leaving the result cell empty so
// the dashboard keeps showing its loading state.
//
// Recoverable conditions never appear here — an unusable FRED series comes
// back as an empty vec, and a failed or rate-limit-exhausted fundamentals
// fetch comes back as `None` and the ticker is simply skipped.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// One or both provider API keys are missing from the environment.
    #[error("missing API credentials: {0}")]
    MissingCredentials(&'static str),

    /// Regime inputs are missing or too short for the rolling windows.
    #[error("macro data unavailable: {0}")]
    DataUnavailable(&'static str),

    /// No security survived the cleaning filter.
    #[error("no valid securities remaining after filtering")]
    InsufficientUniverse,

    /// A required metric field is absent from every fetched record.
    #[error("metrics panel is malformed: field `{0}` missing from all records")]
    MalformedPanel(&'static str),
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_offender() {
        let e = PipelineError::MalformedPanel("valuation_ratio");
        assert!(e.to_string().contains("valuation_ratio"));

        let e = PipelineError::DataUnavailable("rate series empty");
        assert!(e.to_string().contains("rate series empty"));
    }
}
