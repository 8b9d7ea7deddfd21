//! Unit tests for notification formatting

use perpscan::models::signal::StrategyKind;
use perpscan::services::notifier::{format_price, format_signal, publish_signals, LogNotifier};

use crate::support::{ranked_signal, short_signal};

#[test]
fn test_format_price_by_magnitude() {
    assert_eq!(format_price(43_210.123), "43210.12");
    assert_eq!(format_price(1.23456), "1.2346");
    assert_eq!(format_price(0.000123456), "0.000123");
}

#[test]
fn test_format_signal_message() {
    let message = format_signal(&ranked_signal("BTCUSDT", 62.5, 90.0, StrategyKind::TrendFollow));
    let expected = "📈 BTCUSDT [LONG] | Trend\n\
                    Entry: 100.00 | TP: 108.00 | SL: 96.0000\n\
                    Confidence: 90% | Score: 62.50\n\
                    Regime: trend | Trend: bullish\n\
                    Timestamp: 2023-11-14 22:13:20 UTC";
    assert_eq!(message, expected);
}

#[test]
fn test_format_short_signal_header() {
    let message = format_signal(&short_signal("ETHUSDT"));
    assert!(message.starts_with("📈 ETHUSDT [SHORT] | Mean-Reversion"));
    assert!(message.contains("Regime: mean_reversion | Trend: bearish"));
}

#[tokio::test]
async fn test_log_notifier_delivers_everything() {
    let signals = vec![short_signal("ETHUSDT"), short_signal("SOLUSDT")];
    assert_eq!(publish_signals(&LogNotifier, &signals).await, 2);
}
