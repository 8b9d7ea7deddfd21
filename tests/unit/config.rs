//! Unit tests for scan configuration

use perpscan::config::{
    get_scan_every_seconds, IndicatorParams, RiskParams, ScanConfig, TargetPolicy,
    DEFAULT_SCAN_EVERY_SECONDS,
};
use perpscan::error::ErrorKind;
use std::time::Duration;

#[test]
fn test_defaults_are_valid() {
    let config = ScanConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.interval, "1h");
    assert_eq!(config.top_n, 5);
    assert_eq!(config.workers, 20);
    assert_eq!(config.risk.target, TargetPolicy::RiskReward(2.0));
    assert_eq!(config.trend_timeframes, vec!["15m", "1h", "4h"]);
}

#[test]
fn test_indicator_warmup_is_longest_window() {
    assert_eq!(IndicatorParams::default().warmup(), 50);
    let params = IndicatorParams {
        sma_long: 10,
        ..IndicatorParams::default()
    };
    // ema_slow 21 is now the longest
    assert_eq!(params.warmup(), 21);
}

fn expect_config_error(config: ScanConfig) {
    let err = config.validate().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration, "{}", err);
}

#[test]
fn test_invalid_values_fail_fast() {
    expect_config_error(ScanConfig {
        workers: 0,
        ..ScanConfig::default()
    });
    expect_config_error(ScanConfig {
        top_n: 0,
        ..ScanConfig::default()
    });
    expect_config_error(ScanConfig {
        fetch_timeout: Duration::ZERO,
        ..ScanConfig::default()
    });
    expect_config_error(ScanConfig {
        warmup_bars: 30,
        ..ScanConfig::default()
    });
    expect_config_error(ScanConfig {
        risk: RiskParams {
            leverage: 1.0,
            ..RiskParams::default()
        },
        ..ScanConfig::default()
    });
    expect_config_error(ScanConfig {
        risk: RiskParams {
            stop_pct: 0.0,
            ..RiskParams::default()
        },
        ..ScanConfig::default()
    });
    expect_config_error(ScanConfig {
        risk: RiskParams {
            target: TargetPolicy::FixedPercent(-0.1),
            ..RiskParams::default()
        },
        ..ScanConfig::default()
    });
}

#[test]
fn test_margin_that_crosses_entry_is_rejected() {
    // at 20x the liquidation sits 5% away; a 6% margin puts the long stop above entry
    expect_config_error(ScanConfig {
        risk: RiskParams {
            safety_margin: 0.06,
            ..RiskParams::default()
        },
        ..ScanConfig::default()
    });

    // 1.05 / 0.95 factors break the short side at 20x
    expect_config_error(ScanConfig {
        risk: RiskParams {
            safety_margin: 0.05,
            ..RiskParams::default()
        },
        ..ScanConfig::default()
    });

    let ok = ScanConfig {
        risk: RiskParams {
            leverage: 10.0,
            safety_margin: 0.05,
            ..RiskParams::default()
        },
        ..ScanConfig::default()
    };
    assert!(ok.validate().is_ok());
}

#[test]
fn test_target_policy_parsing() {
    assert_eq!("rr:2".parse::<TargetPolicy>().unwrap(), TargetPolicy::RiskReward(2.0));
    assert_eq!(
        "pct:0.25".parse::<TargetPolicy>().unwrap(),
        TargetPolicy::FixedPercent(0.25)
    );
    assert!("2".parse::<TargetPolicy>().is_err());
    assert!("atr:1".parse::<TargetPolicy>().is_err());
    assert!("rr:abc".parse::<TargetPolicy>().is_err());
}

#[test]
fn test_from_env_overrides() {
    std::env::set_var("SCAN_LEVERAGE", "10");
    std::env::set_var("SCAN_TARGET_POLICY", "pct:0.2");
    std::env::set_var("SCAN_TREND_TIMEFRAMES", "1h, 4h");
    let config = ScanConfig::from_env().unwrap();
    assert_eq!(config.risk.leverage, 10.0);
    assert_eq!(config.risk.target, TargetPolicy::FixedPercent(0.2));
    assert_eq!(config.trend_timeframes, vec!["1h", "4h"]);

    std::env::set_var("SCAN_WORKERS", "many");
    let err = ScanConfig::from_env().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    for key in ["SCAN_LEVERAGE", "SCAN_TARGET_POLICY", "SCAN_TREND_TIMEFRAMES", "SCAN_WORKERS"] {
        std::env::remove_var(key);
    }
}

#[test]
fn test_config_serializes_round_trip() {
    let config = ScanConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let back: ScanConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_scan_every_seconds_rejects_garbage() {
    std::env::remove_var("SCAN_EVERY_SECONDS");
    assert_eq!(get_scan_every_seconds().unwrap(), DEFAULT_SCAN_EVERY_SECONDS);

    std::env::set_var("SCAN_EVERY_SECONDS", "900");
    assert_eq!(get_scan_every_seconds().unwrap(), 900);

    std::env::set_var("SCAN_EVERY_SECONDS", "hourly");
    let err = get_scan_every_seconds().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);

    std::env::remove_var("SCAN_EVERY_SECONDS");
}
