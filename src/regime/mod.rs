// =============================================================================
// Macro Regime Module
// =============================================================================
//
// Classifies the macroeconomic environment into one of four regimes by
// comparing two FRED series against their own trailing averages:
// - Policy rate vs its ~5-year trailing mean (rate pressure)
// - Fed balance-sheet size vs its 1-year trailing mean (liquidity direction)

pub mod classifier;

pub use classifier::{classify, MacroRegime, RegimeSnapshot};
