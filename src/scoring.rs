// =============================================================================
// Scoring Engine — Regime-conditioned cross-sectional z-score composite
// =============================================================================
//
// Turns a noisy, partially-missing fundamentals panel into a ranked long and
// short list:
//
//   1. Drop securities missing any required factor or with a non-positive
//      valuation multiple.
//   2. Derive profitability_score = margin * (1 / PE) — high margin bought
//      at a cheap multiple.
//   3. Z-score growth and profitability across the surviving panel.
//   4. Combine per the macro regime: A leans pure growth, D leans pure
//      profitability/value, B and C take the balanced sum.
//   5. Stable-sort descending; head is the long list, tail (worst first) is
//      the short list.
//
// Ranking always happens on unrounded values; any rounding is left to the
// presentation layer.

use serde::Serialize;

use crate::errors::PipelineError;
use crate::providers::finnhub::SecurityMetrics;
use crate::regime::MacroRegime;
use crate::stats::zscores;

// =============================================================================
// Types
// =============================================================================

/// One security that survived the cleaning filter, with its standardized
/// factors and composite score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredSecurity {
    pub ticker: String,
    /// Revenue growth, percent YoY.
    pub growth: f64,
    /// Operating margin, percent.
    pub margin: f64,
    /// PE multiple (display only; already folded into profitability).
    pub valuation_ratio: f64,
    pub profitability_score: f64,
    pub z_growth: f64,
    pub z_profitability: f64,
    pub final_score: f64,
}

/// Output of one scoring pass.
#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    pub strategy_note: String,
    /// Highest composite scores first.
    pub long_candidates: Vec<ScoredSecurity>,
    /// Bottom slice of the ranking, worst score first.
    pub short_candidates: Vec<ScoredSecurity>,
}

// =============================================================================
// Scoring
// =============================================================================

/// Score the panel under `regime` and slice the top/bottom `top_n`.
///
/// Fails with `MalformedPanel` when a required factor is absent from every
/// record (provider schema drift) and with `InsufficientUniverse` when
/// nothing survives the cleaning filter.
pub fn score(
    panel: &[SecurityMetrics],
    regime: MacroRegime,
    top_n: usize,
) -> Result<Ranking, PipelineError> {
    if panel.is_empty() {
        return Err(PipelineError::InsufficientUniverse);
    }
    check_panel_shape(panel)?;

    // Cleaning filter: all three factors present, PE strictly positive.
    let cleaned: Vec<(&SecurityMetrics, f64, f64, f64)> = panel
        .iter()
        .filter_map(|m| {
            let pe = m.valuation_ratio?;
            let margin = m.operating_margin?;
            let growth = m.revenue_growth?;
            (pe > 0.0).then_some((m, pe, margin, growth))
        })
        .collect();

    if cleaned.is_empty() {
        return Err(PipelineError::InsufficientUniverse);
    }

    let growth: Vec<f64> = cleaned.iter().map(|(_, _, _, g)| *g).collect();
    let profitability: Vec<f64> = cleaned
        .iter()
        .map(|(_, pe, margin, _)| margin * (1.0 / pe))
        .collect();

    let z_growth = zscores(&growth);
    let z_profitability = zscores(&profitability);

    let (strategy_note, composite): (String, Box<dyn Fn(f64, f64) -> f64>) = match regime {
        MacroRegime::Expansion => (
            "Regime A: Prioritizing pure Growth (z_growth).".to_string(),
            Box::new(|zg, _zp| zg),
        ),
        MacroRegime::Tightening => (
            "Regime D: Prioritizing Profitability & Value (z_profit).".to_string(),
            Box::new(|_zg, zp| zp),
        ),
        other => (
            format!("Regime {}: Balanced Growth + Profitability.", other.letter()),
            Box::new(|zg, zp| zg + zp),
        ),
    };

    let mut ranked: Vec<ScoredSecurity> = cleaned
        .iter()
        .enumerate()
        .map(|(i, (m, pe, margin, g))| ScoredSecurity {
            ticker: m.ticker.clone(),
            growth: *g,
            margin: *margin,
            valuation_ratio: *pe,
            profitability_score: profitability[i],
            z_growth: z_growth[i],
            z_profitability: z_profitability[i],
            final_score: composite(z_growth[i], z_profitability[i]),
        })
        .collect();

    // Stable sort keeps the original relative order of tied scores.
    ranked.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let take = top_n.min(ranked.len());
    let long_candidates = ranked[..take].to_vec();
    // Bottom slice presented worst-score-first.
    let short_candidates: Vec<ScoredSecurity> =
        ranked[ranked.len() - take..].iter().rev().cloned().collect();

    Ok(Ranking { strategy_note, long_candidates, short_candidates })
}

/// Guard against provider schema drift: a factor that is null in *every*
/// record means the field mapping is broken, not that data is thin.
fn check_panel_shape(panel: &[SecurityMetrics]) -> Result<(), PipelineError> {
    if panel.iter().all(|m| m.valuation_ratio.is_none()) {
        return Err(PipelineError::MalformedPanel("valuation_ratio"));
    }
    if panel.iter().all(|m| m.operating_margin.is_none()) {
        return Err(PipelineError::MalformedPanel("operating_margin"));
    }
    if panel.iter().all(|m| m.revenue_growth.is_none()) {
        return Err(PipelineError::MalformedPanel("revenue_growth"));
    }
    Ok(())
}
