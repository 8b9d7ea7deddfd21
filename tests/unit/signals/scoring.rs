//! Unit tests for the composite score

use perpscan::config::ScoreWeights;
use perpscan::models::indicators::BollingerBand;
use perpscan::models::signal::{Side, Trend};
use perpscan::signals::scoring::{composite_score, macd_aligned, rsi_in_band, ScoreInputs};
use perpscan::signals::trend::Confluence;

use crate::support::{all_votes, votes};

fn inputs(side: Side) -> ScoreInputs {
    ScoreInputs {
        side,
        confluence: Confluence::default(),
        rsi: 50.0,
        macd_histogram: None,
        close: 100.0,
        bollinger: BollingerBand {
            upper: 105.0,
            middle: 100.0,
            lower: 95.0,
        },
        volume_spike: false,
        confidence: 0.0,
        risk_reward: 0.0,
    }
}

#[test]
fn test_rsi_bands_are_exclusive() {
    assert!(rsi_in_band(Side::Long, 50.0));
    assert!(!rsi_in_band(Side::Long, 45.0));
    assert!(!rsi_in_band(Side::Long, 70.0));
    assert!(rsi_in_band(Side::Short, 40.0));
    assert!(!rsi_in_band(Side::Short, 55.0));
    assert!(!rsi_in_band(Side::Short, 30.0));
}

#[test]
fn test_macd_alignment_by_side() {
    assert!(macd_aligned(Side::Long, Some(0.1)));
    assert!(!macd_aligned(Side::Long, Some(-0.1)));
    assert!(macd_aligned(Side::Short, Some(-0.1)));
    assert!(!macd_aligned(Side::Short, None));
}

#[test]
fn test_every_factor_at_full_weight() {
    let weights = ScoreWeights::default();
    let mut input = inputs(Side::Long);
    input.confluence = Confluence::for_side(Side::Long, &all_votes(Trend::Bullish));
    input.rsi = 60.0;
    input.macd_histogram = Some(0.5);
    input.close = 106.0;
    input.volume_spike = true;
    input.confidence = 90.0;
    input.risk_reward = 2.0;

    // 10 + 10 + 10 + 5 + 10 + 27 + 10
    assert_eq!(composite_score(&input, &weights), 82.0);
}

#[test]
fn test_partial_confluence_and_mid_rr_tier() {
    let weights = ScoreWeights::default();
    let mut input = inputs(Side::Short);
    input.confluence = Confluence::for_side(
        Side::Short,
        &votes(&[("15m", Trend::Bearish), ("1h", Trend::Bearish), ("4h", Trend::Neutral)]),
    );
    input.risk_reward = 1.5;
    input.confidence = 85.0;

    // 5 + 10 + 25.5 + 5
    assert_eq!(composite_score(&input, &weights), 45.5);
}

#[test]
fn test_score_is_rounded_to_two_decimals() {
    let weights = ScoreWeights {
        confidence_factor: 1.0 / 3.0,
        ..ScoreWeights::default()
    };
    let mut input = inputs(Side::Long);
    input.rsi = 80.0;
    input.confidence = 10.0;
    assert_eq!(composite_score(&input, &weights), 3.33);
}
