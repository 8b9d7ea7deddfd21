//! Market regime classification from moving-average divergence and RSI

use crate::config::RegimeParams;
use crate::models::indicators::IndicatorSnapshot;
use crate::models::signal::{Regime, Side, Trend};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeReading {
    /// One of trend, mean_reversion or scalp
    pub primary: Regime,
    /// Side of the reversal overlay, when it fires
    pub reversal: Option<Side>,
    /// Direction of the short average against the long one
    pub market_trend: Trend,
    pub divergence: f64,
}

/// `|short - long| / long`, 0 when the long average is 0
pub fn divergence(short: f64, long: f64) -> f64 {
    if long == 0.0 {
        return 0.0;
    }
    (short - long).abs() / long.abs()
}

pub fn market_trend(short: f64, long: f64) -> Trend {
    if short > long {
        Trend::Bullish
    } else if short < long {
        Trend::Bearish
    } else {
        Trend::Neutral
    }
}

pub struct RegimeClassifier;

impl RegimeClassifier {
    pub fn classify(snapshot: &IndicatorSnapshot, params: &RegimeParams) -> RegimeReading {
        let divergence = divergence(snapshot.sma_short, snapshot.sma_long);
        let rsi = snapshot.rsi;

        let primary = if divergence > params.divergence_threshold {
            Regime::Trend
        } else if rsi < params.rsi_oversold || rsi > params.rsi_overbought {
            Regime::MeanReversion
        } else {
            Regime::Scalp
        };

        let reversal = if rsi > params.rsi_overbought && snapshot.close > snapshot.bollinger.upper {
            Some(Side::Short)
        } else if rsi < params.rsi_oversold && snapshot.close < snapshot.bollinger.lower {
            Some(Side::Long)
        } else {
            None
        };

        RegimeReading {
            primary,
            reversal,
            market_trend: market_trend(snapshot.sma_short, snapshot.sma_long),
            divergence,
        }
    }
}
