// =============================================================================
// Macro Regime Classifier — A/B/C/D quadrants
// =============================================================================
//
// Two boolean comparisons define a four-state regime:
//
//   high_rate      = current policy rate   not below its trailing 260-row mean
//   high_liquidity = current balance sheet not below its trailing 52-row mean
//
//   (low,  high) => A  Expansion
//   (low,  low ) => B  Deflation/Slow
//   (high, high) => C  Inflationary Boom
//   (high, low ) => D  Tightening/Risk-Off
//
// The rate series is monthly and the balance sheet weekly, so both are first
// aligned onto the balance-sheet timeline with a backward as-of join.  All
// rolling windows are counted in aligned (weekly) rows; 260 rows of the rate
// column approximate a 5-year average.
//
// Ties count as "high": a strictly lower current value is the only way to
// land in a low branch.

use chrono::NaiveDate;
use serde::Serialize;

use crate::errors::PipelineError;
use crate::providers::fred::TimeSeriesPoint;
use crate::stats::trailing_mean;

/// Rate trailing-mean window, in aligned weekly rows (~5 years).
const RATE_WINDOW: usize = 260;
const RATE_MIN_PERIODS: usize = 50;
/// Balance-sheet trailing-mean window (~1 year of weekly observations).
const BALANCE_SHEET_WINDOW: usize = 52;
const BALANCE_SHEET_MIN_PERIODS: usize = 20;

// =============================================================================
// Types
// =============================================================================

/// The four macro regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MacroRegime {
    /// A — low rates, rising liquidity.
    Expansion,
    /// B — low rates, falling liquidity.
    DeflationSlow,
    /// C — high rates, rising liquidity.
    InflationaryBoom,
    /// D — high rates, falling liquidity.
    Tightening,
}

impl MacroRegime {
    /// One-letter label used on the dashboard badge and in the strategy note.
    pub fn letter(self) -> char {
        match self {
            Self::Expansion => 'A',
            Self::DeflationSlow => 'B',
            Self::InflationaryBoom => 'C',
            Self::Tightening => 'D',
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Expansion => "Expansion (Low Rates, Rising Liquidity)",
            Self::DeflationSlow => "Deflation/Slow (Low Rates, Falling Liquidity)",
            Self::InflationaryBoom => "Inflationary Boom (High Rates, Rising Liquidity)",
            Self::Tightening => "Tightening/Risk-Off (High Rates, Falling Liquidity)",
        }
    }

    fn from_comparisons(high_rate: bool, high_liquidity: bool) -> Self {
        match (high_rate, high_liquidity) {
            (false, true) => Self::Expansion,
            (false, false) => Self::DeflationSlow,
            (true, true) => Self::InflationaryBoom,
            (true, false) => Self::Tightening,
        }
    }
}

impl std::fmt::Display for MacroRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Snapshot of the classified regime plus the comparisons that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct RegimeSnapshot {
    pub regime: MacroRegime,
    /// Date of the most recent aligned observation.
    pub as_of: NaiveDate,
    pub rate_current: f64,
    pub rate_avg: f64,
    pub balance_sheet_current: f64,
    pub balance_sheet_avg: f64,
}

/// One row of the aligned (balance-sheet-timeline) frame.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AlignedRow {
    date: NaiveDate,
    rate: f64,
    balance_sheet: f64,
}

// =============================================================================
// Alignment
// =============================================================================

/// Backward as-of join of the rate series onto the balance-sheet timeline.
///
/// For each balance-sheet observation, takes the most recent rate observation
/// on or before that date.  Balance-sheet rows earlier than the first rate
/// observation have no match and are dropped.  Both inputs are assumed
/// strictly increasing by date.
fn align_backward(rate: &[TimeSeriesPoint], balance_sheet: &[TimeSeriesPoint]) -> Vec<AlignedRow> {
    let mut rows = Vec::with_capacity(balance_sheet.len());
    let mut rate_idx: Option<usize> = None;
    let mut cursor = 0;

    for point in balance_sheet {
        while cursor < rate.len() && rate[cursor].date <= point.date {
            rate_idx = Some(cursor);
            cursor += 1;
        }
        if let Some(i) = rate_idx {
            rows.push(AlignedRow {
                date: point.date,
                rate: rate[i].value,
                balance_sheet: point.value,
            });
        }
    }

    rows
}

// =============================================================================
// Classification
// =============================================================================

/// Classify the current macro regime from the two input series.
///
/// Pure function over fetched data: the regime depends only on the sign of
/// (rate_current - rate_avg) and (balance_sheet_current - balance_sheet_avg).
///
/// Fails with `DataUnavailable` when either series is empty or the aligned
/// frame is too short for the minimum-period requirements — a run must never
/// produce a result without a regime.
pub fn classify(
    rate: &[TimeSeriesPoint],
    balance_sheet: &[TimeSeriesPoint],
) -> Result<RegimeSnapshot, PipelineError> {
    if rate.is_empty() {
        return Err(PipelineError::DataUnavailable("rate series is empty"));
    }
    if balance_sheet.is_empty() {
        return Err(PipelineError::DataUnavailable("balance-sheet series is empty"));
    }

    let aligned = align_backward(rate, balance_sheet);

    let rates: Vec<f64> = aligned.iter().map(|r| r.rate).collect();
    let sheets: Vec<f64> = aligned.iter().map(|r| r.balance_sheet).collect();

    let rate_avg = trailing_mean(&rates, RATE_WINDOW, RATE_MIN_PERIODS)
        .ok_or(PipelineError::DataUnavailable(
            "fewer aligned rows than the rate window requires",
        ))?;
    let balance_sheet_avg = trailing_mean(&sheets, BALANCE_SHEET_WINDOW, BALANCE_SHEET_MIN_PERIODS)
        .ok_or(PipelineError::DataUnavailable(
            "fewer aligned rows than the balance-sheet window requires",
        ))?;

    // trailing_mean succeeding implies at least one aligned row.
    let current = aligned[aligned.len() - 1];

    // Ties count as high: only a strictly lower current value selects a low
    // branch.
    let high_rate = current.rate >= rate_avg;
    let high_liquidity = current.balance_sheet >= balance_sheet_avg;

    Ok(RegimeSnapshot {
        regime: MacroRegime::from_comparisons(high_rate, high_liquidity),
        as_of: current.date,
        rate_current: current.rate,
        rate_avg,
        balance_sheet_current: current.balance_sheet,
        balance_sheet_avg,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn date(offset_days: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Duration::days(offset_days)
    }

    /// Weekly series over `values`, one point every 7 days.
    fn weekly(values: &[f64]) -> Vec<TimeSeriesPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| TimeSeriesPoint { date: date(7 * i as i64), value })
            .collect()
    }

    /// 60 flat weeks ending on `last` — enough rows for both min-periods.
    fn flat_then(base: f64, last: f64) -> Vec<TimeSeriesPoint> {
        let mut values = vec![base; 59];
        values.push(last);
        weekly(&values)
    }

    // ---- align_backward --------------------------------------------------

    #[test]
    fn align_takes_most_recent_rate_on_or_before() {
        // Monthly-ish rate, weekly balance sheet.
        let rate = vec![
            TimeSeriesPoint { date: date(0), value: 1.0 },
            TimeSeriesPoint { date: date(30), value: 2.0 },
        ];
        let bs = weekly(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);

        let rows = align_backward(&rate, &bs);
        assert_eq!(rows.len(), 6);
        // Days 0..28 use the 1.0 rate, days 30+ the 2.0 rate.
        assert_eq!(rows[4].rate, 1.0); // day 28
        assert_eq!(rows[5].rate, 2.0); // day 35
        assert_eq!(rows[5].balance_sheet, 15.0);
    }

    #[test]
    fn align_drops_rows_before_first_rate_observation() {
        let rate = vec![TimeSeriesPoint { date: date(14), value: 1.0 }];
        let bs = weekly(&[10.0, 11.0, 12.0, 13.0]);

        let rows = align_backward(&rate, &bs);
        // Days 0 and 7 precede the first rate point.
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, date(14));
    }

    #[test]
    fn align_exact_date_match_is_included() {
        let rate = vec![TimeSeriesPoint { date: date(0), value: 3.0 }];
        let bs = vec![TimeSeriesPoint { date: date(0), value: 9.0 }];
        let rows = align_backward(&rate, &bs);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rate, 3.0);
    }

    // ---- classify: the four quadrants ------------------------------------

    #[test]
    fn low_rate_high_liquidity_is_expansion() {
        let rate = flat_then(2.0, 1.0); // current below average
        let bs = flat_then(100.0, 200.0); // current above average
        let snap = classify(&rate, &bs).unwrap();
        assert_eq!(snap.regime, MacroRegime::Expansion);
        assert_eq!(snap.regime.letter(), 'A');
    }

    #[test]
    fn low_rate_low_liquidity_is_deflation() {
        let snap = classify(&flat_then(2.0, 1.0), &flat_then(100.0, 50.0)).unwrap();
        assert_eq!(snap.regime, MacroRegime::DeflationSlow);
    }

    #[test]
    fn high_rate_high_liquidity_is_inflationary_boom() {
        let snap = classify(&flat_then(2.0, 3.0), &flat_then(100.0, 200.0)).unwrap();
        assert_eq!(snap.regime, MacroRegime::InflationaryBoom);
    }

    #[test]
    fn high_rate_low_liquidity_is_tightening() {
        let snap = classify(&flat_then(2.0, 3.0), &flat_then(100.0, 50.0)).unwrap();
        assert_eq!(snap.regime, MacroRegime::Tightening);
    }

    #[test]
    fn tie_with_average_counts_as_high() {
        // Perfectly flat series: current == average on both axes => C.
        let snap = classify(&flat_then(2.0, 2.0), &flat_then(100.0, 100.0)).unwrap();
        assert_eq!(snap.regime, MacroRegime::InflationaryBoom);
    }

    // ---- classify: failure modes -----------------------------------------

    #[test]
    fn empty_rate_series_is_unavailable() {
        let bs = flat_then(100.0, 100.0);
        assert!(matches!(
            classify(&[], &bs),
            Err(PipelineError::DataUnavailable(_))
        ));
    }

    #[test]
    fn empty_balance_sheet_series_is_unavailable() {
        let rate = flat_then(2.0, 2.0);
        assert!(matches!(
            classify(&rate, &[]),
            Err(PipelineError::DataUnavailable(_))
        ));
    }

    #[test]
    fn too_few_aligned_rows_is_unavailable() {
        // 30 aligned rows: enough for the balance-sheet window (min 20) but
        // not the rate window (min 50).
        let rate = weekly(&vec![2.0; 30]);
        let bs = weekly(&vec![100.0; 30]);
        assert!(matches!(
            classify(&rate, &bs),
            Err(PipelineError::DataUnavailable(_))
        ));
    }

    #[test]
    fn snapshot_reports_the_inputs_it_compared() {
        let snap = classify(&flat_then(2.0, 3.0), &flat_then(100.0, 50.0)).unwrap();
        assert_eq!(snap.rate_current, 3.0);
        assert_eq!(snap.balance_sheet_current, 50.0);
        assert!(snap.rate_avg < 3.0);
        assert!(snap.balance_sheet_avg > 50.0);
        assert_eq!(snap.as_of, date(7 * 59));
    }
}
