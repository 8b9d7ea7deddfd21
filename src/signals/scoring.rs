//! Composite confluence score

use crate::common::math;
use crate::config::ScoreWeights;
use crate::models::indicators::BollingerBand;
use crate::models::signal::Side;
use crate::signals::trend::Confluence;

pub const LONG_RSI_BAND: (f64, f64) = (45.0, 70.0);
pub const SHORT_RSI_BAND: (f64, f64) = (30.0, 55.0);

/// Everything the score looks at for one candidate
#[derive(Debug, Clone, Copy)]
pub struct ScoreInputs {
    pub side: Side,
    pub confluence: Confluence,
    pub rsi: f64,
    pub macd_histogram: Option<f64>,
    pub close: f64,
    pub bollinger: BollingerBand,
    pub volume_spike: bool,
    pub confidence: f64,
    pub risk_reward: f64,
}

/// RSI strictly inside the band favourable to `side`
pub fn rsi_in_band(side: Side, rsi: f64) -> bool {
    let (low, high) = match side {
        Side::Long => LONG_RSI_BAND,
        Side::Short => SHORT_RSI_BAND,
    };
    rsi > low && rsi < high
}

pub fn macd_aligned(side: Side, histogram: Option<f64>) -> bool {
    match (side, histogram) {
        (Side::Long, Some(h)) => h > 0.0,
        (Side::Short, Some(h)) => h < 0.0,
        (_, None) => false,
    }
}

/// Weighted sum of the agreeing factors, rounded to 2 decimals
pub fn composite_score(inputs: &ScoreInputs, weights: &ScoreWeights) -> f64 {
    let mut score = 0.0;

    if inputs.confluence.is_full() {
        score += weights.full_confluence;
    } else if inputs.confluence.is_majority() {
        score += weights.partial_confluence;
    }

    if rsi_in_band(inputs.side, inputs.rsi) {
        score += weights.rsi_band;
    }
    if macd_aligned(inputs.side, inputs.macd_histogram) {
        score += weights.macd_alignment;
    }
    if inputs.bollinger.is_breakout(inputs.close) {
        score += weights.bollinger_breakout;
    }
    if inputs.volume_spike {
        score += weights.volume_spike;
    }

    score += inputs.confidence * weights.confidence_factor;

    if inputs.risk_reward >= weights.rr_high_threshold {
        score += weights.rr_high;
    } else if inputs.risk_reward >= weights.rr_mid_threshold {
        score += weights.rr_mid;
    }

    math::round_to(score, 2)
}
