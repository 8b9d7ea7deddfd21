//! Unit tests for the signal model

use perpscan::models::signal::{Side, StrategyKind, Trend};

use crate::support::{ranked_signal, short_signal};

#[test]
fn test_signal_serializes_flat_record() {
    let signal = ranked_signal("BTCUSDT", 62.5, 90.0, StrategyKind::MeanReversion);
    let value = serde_json::to_value(&signal).unwrap();
    let object = value.as_object().unwrap();

    assert_eq!(object.len(), 13);
    assert_eq!(object["symbol"], "BTCUSDT");
    assert_eq!(object["side"], "long");
    assert_eq!(object["regime"], "mean_reversion");
    assert_eq!(object["trend"], "bullish");
    assert_eq!(object["strategy"], "mean_reversion");
    assert_eq!(object["position_size"], 0.25);
}

#[test]
fn test_risk_reward_and_pnl() {
    let signal = ranked_signal("BTCUSDT", 60.0, 90.0, StrategyKind::TrendFollow);
    assert_eq!(signal.risk_per_unit(), 4.0);
    assert_eq!(signal.reward_per_unit(), 8.0);
    assert_eq!(signal.risk_reward(), 2.0);
    assert_eq!(signal.risk_amount(), 1.0);
    assert_eq!(signal.forecast_pnl(), 2.0);

    let mut zero_risk = signal.clone();
    zero_risk.stop = zero_risk.entry;
    assert_eq!(zero_risk.risk_reward(), 0.0);
}

#[test]
fn test_well_formed_price_ladder() {
    assert!(ranked_signal("AAA", 60.0, 90.0, StrategyKind::TrendFollow).is_well_formed());
    assert!(short_signal("BBB").is_well_formed());

    let mut stop_past_liquidation = ranked_signal("AAA", 60.0, 90.0, StrategyKind::TrendFollow);
    stop_past_liquidation.stop = 94.0;
    assert!(!stop_past_liquidation.is_well_formed());

    let mut empty = short_signal("BBB");
    empty.position_size = 0.0;
    assert!(!empty.is_well_formed());
}

#[test]
fn test_side_and_trend_vocabulary() {
    assert_eq!(Side::Long.sign(), 1.0);
    assert_eq!(Side::Short.sign(), -1.0);
    assert_eq!(Side::Short.aligned_trend(), Trend::Bearish);
    assert_eq!(Trend::Bullish.side(), Some(Side::Long));
    assert_eq!(Trend::Neutral.side(), None);
    assert_eq!(StrategyKind::ScalpBreakout.to_string(), "Scalp Breakout");
}
