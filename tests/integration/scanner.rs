//! Integration tests for the concurrent scanner over a scripted data source

use perpscan::core::Scanner;
use perpscan::error::ErrorKind;
use perpscan::metrics::Metrics;
use perpscan::models::signal::{Side, StrategyKind, Trend};
use perpscan::signals::TrendClassifier;
use perpscan::services::market_data::DataUnavailable;
use std::sync::Arc;
use std::time::Duration;

use crate::test_utils::{choppy, falling, rising, symbols, test_config, Script, ScriptedSource};

fn universe() -> ScriptedSource {
    ScriptedSource::new()
        .with("AAAUSDT", Script::Closes(rising(100)))
        .with("BBBUSDT", Script::Closes(falling(100)))
        .with("CCCUSDT", Script::Closes(choppy(100)))
}

fn scanner(source: ScriptedSource) -> Scanner {
    Scanner::new(Arc::new(source), test_config()).expect("valid config")
}

#[tokio::test]
async fn scan_collects_signals_from_every_symbol() {
    let scanner = scanner(universe());
    let result = scanner
        .scan(&symbols(&["AAAUSDT", "BBBUSDT", "CCCUSDT"]))
        .await;

    assert_eq!(result.symbols_scanned, 3);
    assert_eq!(result.failure_count(), 0);
    assert_eq!(result.no_signal, 1);

    let long = result
        .accepted
        .iter()
        .find(|s| s.symbol == "AAAUSDT")
        .expect("uptrend signal");
    assert_eq!(long.side, Side::Long);
    assert_eq!(long.strategy, StrategyKind::TrendFollow);
    assert!(long.is_well_formed());

    let short = result
        .accepted
        .iter()
        .find(|s| s.symbol == "BBBUSDT")
        .expect("downtrend signal");
    assert_eq!(short.side, Side::Short);
    assert!(short.is_well_formed());

    assert!(result.accepted.iter().all(|s| s.symbol != "CCCUSDT"));
    assert!(result
        .accepted
        .windows(2)
        .all(|pair| pair[0].score >= pair[1].score));
}

#[tokio::test]
async fn failing_symbol_is_isolated() {
    let healthy = scanner(universe())
        .scan(&symbols(&["AAAUSDT", "BBBUSDT"]))
        .await;

    let source = universe().with(
        "BADUSDT",
        Script::Fail(DataUnavailable::Http("connection reset".to_string())),
    );
    let degraded = scanner(source)
        .scan(&symbols(&["AAAUSDT", "BADUSDT", "BBBUSDT"]))
        .await;

    assert_eq!(degraded.failure_count(), healthy.failure_count() + 1);
    assert_eq!(degraded.failures[0].symbol, "BADUSDT");
    assert_eq!(degraded.failures[0].kind, ErrorKind::ExternalService);

    let keys = |signals: &[perpscan::models::Signal]| {
        signals
            .iter()
            .map(|s| (s.symbol.clone(), s.side, s.strategy, s.entry, s.score))
            .collect::<Vec<_>>()
    };
    assert_eq!(keys(&degraded.accepted), keys(&healthy.accepted));
}

#[tokio::test]
async fn slow_symbol_is_recorded_as_timeout() {
    let source = universe().with(
        "SLOWUSDT",
        Script::Slow(Duration::from_millis(1_000), rising(100)),
    );
    let result = scanner(source)
        .scan(&symbols(&["AAAUSDT", "SLOWUSDT"]))
        .await;

    assert_eq!(result.failure_count(), 1);
    let failure = &result.failures[0];
    assert_eq!(failure.symbol, "SLOWUSDT");
    assert_eq!(failure.kind, ErrorKind::ExternalService);
    assert!(failure.message.contains("timed out"));
    assert!(result.accepted.iter().any(|s| s.symbol == "AAAUSDT"));
}

#[tokio::test]
async fn failed_trend_timeframe_votes_neutral() {
    let source = ScriptedSource::new().with(
        "AAAUSDT",
        Script::FailOn("4h".to_string(), rising(100)),
    );
    let classifier = TrendClassifier::new(Arc::new(source), &test_config());
    let votes = classifier.votes("AAAUSDT").await;

    assert_eq!(votes.len(), 3);
    assert_eq!(votes["15m"], Trend::Bullish);
    assert_eq!(votes["1h"], Trend::Bullish);
    assert_eq!(votes["4h"], Trend::Neutral);
}

#[tokio::test]
async fn failed_trend_timeframe_does_not_fail_the_symbol() {
    let source = ScriptedSource::new().with(
        "AAAUSDT",
        Script::FailOn("4h".to_string(), rising(100)),
    );
    let result = scanner(source).scan(&symbols(&["AAAUSDT"])).await;

    assert_eq!(result.failure_count(), 0);
    let long = result
        .accepted
        .iter()
        .find(|s| s.symbol == "AAAUSDT")
        .expect("signal despite a missing timeframe");
    assert_eq!(long.side, Side::Long);
    assert_eq!(long.strategy, StrategyKind::TrendFollow);
}

#[tokio::test]
async fn panicking_task_is_recorded_under_its_symbol() {
    let source = universe().with("BOOMUSDT", Script::Panic);
    let result = scanner(source)
        .scan(&symbols(&["AAAUSDT", "BOOMUSDT", "BBBUSDT"]))
        .await;

    assert_eq!(result.failure_count(), 1);
    let failure = &result.failures[0];
    assert_eq!(failure.symbol, "BOOMUSDT");
    assert_eq!(failure.kind, ErrorKind::ComputationDegenerate);
    assert!(result.accepted.iter().any(|s| s.symbol == "AAAUSDT"));
    assert!(result.accepted.iter().any(|s| s.symbol == "BBBUSDT"));
}

#[tokio::test]
async fn short_history_is_insufficient_data() {
    let source = universe().with("NEWUSDT", Script::Closes(rising(30)));
    let result = scanner(source).scan(&symbols(&["NEWUSDT"])).await;

    assert_eq!(result.failures_of(ErrorKind::InsufficientData), 1);
    assert!(result.accepted.is_empty());
    assert_eq!(result.no_signal, 0);
}

#[tokio::test]
async fn unknown_symbol_is_external_failure() {
    let result = scanner(universe()).scan(&symbols(&["NOPEUSDT"])).await;
    assert_eq!(result.failures_of(ErrorKind::ExternalService), 1);
}

#[tokio::test]
async fn scan_universe_uses_listing() {
    let source = universe().with_listing(Ok(symbols(&["AAAUSDT", "CCCUSDT"])));
    let result = scanner(source).scan_universe().await.unwrap();
    assert_eq!(result.symbols_scanned, 2);
    assert_eq!(result.no_signal, 1);
}

#[tokio::test]
async fn listing_failure_fails_the_scan() {
    let source = universe().with_listing(Err(DataUnavailable::Http("503".to_string())));
    let err = scanner(source).scan_universe().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalService);
}

#[tokio::test]
async fn invalid_config_is_rejected_before_scanning() {
    let mut config = test_config();
    config.workers = 0;
    let err = Scanner::new(Arc::new(universe()), config).err().expect("invalid");
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn quality_filter_drops_into_rejected() {
    let mut config = test_config();
    config.quality.min_score = 99.0;
    let scanner = Scanner::new(Arc::new(universe()), config).unwrap();
    let result = scanner.scan(&symbols(&["AAAUSDT", "BBBUSDT"])).await;

    assert!(result.accepted.is_empty());
    assert!(result.rejected >= 2);
    assert_eq!(result.no_signal, 0);
}

#[tokio::test]
async fn ranking_is_stable_across_runs() {
    let names = symbols(&["BBBUSDT", "AAAUSDT", "CCCUSDT"]);
    let scanner = scanner(universe());
    let first = scanner.scan(&names).await;
    let mut reversed = names.clone();
    reversed.reverse();
    let second = scanner.scan(&reversed).await;

    let order = |signals: &[perpscan::models::Signal]| {
        signals
            .iter()
            .map(|s| (s.symbol.clone(), s.strategy))
            .collect::<Vec<_>>()
    };
    assert_eq!(order(&first.accepted), order(&second.accepted));
}

#[tokio::test]
async fn small_worker_pool_still_scans_everything() {
    let mut source = ScriptedSource::new();
    let mut names = Vec::new();
    for i in 0..12 {
        let name = format!("S{:02}USDT", i);
        source = source.with(&name, Script::Closes(rising(100)));
        names.push(name);
    }
    let mut config = test_config();
    config.workers = 2;
    let scanner = Scanner::new(Arc::new(source), config).unwrap();

    let result = scanner.scan(&names).await;
    assert_eq!(result.symbols_scanned, 12);
    assert_eq!(result.failure_count(), 0);
    assert_eq!(result.accepted_count(), 12);
    // equal scores fall back to symbol order
    assert_eq!(result.accepted[0].symbol, "S00USDT");
    assert_eq!(result.top().len(), 5);
}

#[tokio::test]
async fn metrics_follow_the_scan() {
    let metrics = Arc::new(Metrics::new().unwrap());
    let scanner = scanner(universe().with(
        "BADUSDT",
        Script::Fail(DataUnavailable::Timeout(200)),
    ))
    .with_metrics(metrics.clone());

    scanner
        .scan(&symbols(&["AAAUSDT", "BADUSDT"]))
        .await;

    assert_eq!(metrics.scans_total.get(), 1);
    assert_eq!(metrics.symbols_scanned_total.get(), 2);
    assert_eq!(
        metrics
            .symbol_failures_total
            .with_label_values(&["external_service"])
            .get(),
        1
    );
}
