//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod scan;
pub mod signal;

pub use indicators::{
    BollingerBand, Candle, IndicatorSet, IndicatorSnapshot, MacdIndicator, PriceSeries,
};
pub use scan::{ScanResult, SymbolFailure};
pub use signal::{Regime, Side, Signal, StrategyKind, Trend};
