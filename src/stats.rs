// =============================================================================
// Statistics Helpers
// =============================================================================
//
// Pure, side-effect-free building blocks shared by the regime classifier and
// the scoring engine.  Every public function returns `Option<T>` so callers
// are forced to handle insufficient-data and numerical-edge-case scenarios.

/// Trailing simple moving average over the last `window` values.
///
/// Rolling-mean semantics evaluated at the final row: when fewer than
/// `window` values exist the mean is taken over everything available, as
/// long as the `min_periods` floor is met.
///
/// # Edge cases
/// - `window == 0` or `min_periods == 0` => `None`
/// - `values.len() < min_periods` => `None`
/// - Non-finite result => `None`
pub fn trailing_mean(values: &[f64], window: usize, min_periods: usize) -> Option<f64> {
    if window == 0 || min_periods == 0 || values.len() < min_periods {
        return None;
    }

    let take = window.min(values.len());
    let tail = &values[values.len() - take..];
    let mean = tail.iter().sum::<f64>() / take as f64;

    mean.is_finite().then_some(mean)
}

/// Population mean of a slice. `None` on empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divisor `n`, not `n - 1`).
///
/// Cross-sectional z-scoring treats the cleaned panel as the full
/// population, so the biased estimator is the right one here.
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Z-score every value against the slice's own population mean and std.
///
/// A standard deviation of exactly zero is substituted with 1.0 so that a
/// degenerate (constant) factor standardizes to all zeros instead of NaN.
pub fn zscores(values: &[f64]) -> Vec<f64> {
    let Some(m) = mean(values) else {
        return Vec::new();
    };
    let mut std = population_std(values).unwrap_or(1.0);
    if std == 0.0 {
        std = 1.0;
    }
    values.iter().map(|v| (v - m) / std).collect()
}
