//! Unit tests for the dry-run execution gateway

use perpscan::models::signal::StrategyKind;
use perpscan::services::execution::{DryRunGateway, ExecutionError, ExecutionGateway};

use crate::support::{ranked_signal, short_signal};

#[tokio::test]
async fn test_dry_run_assigns_sequential_ids() {
    let gateway = DryRunGateway::new();
    let first = gateway
        .place_order(&ranked_signal("BTCUSDT", 60.0, 90.0, StrategyKind::TrendFollow))
        .await
        .unwrap();
    let second = gateway.place_order(&short_signal("ETHUSDT")).await.unwrap();

    assert_eq!(first, "dry-BTCUSDT-1");
    assert_eq!(second, "dry-ETHUSDT-2");
    assert_eq!(gateway.orders_placed(), 2);
}

#[tokio::test]
async fn test_dry_run_rejects_broken_ladder() {
    let gateway = DryRunGateway::new();
    let mut signal = short_signal("ETHUSDT");
    signal.stop = 99.0;

    let err = gateway.place_order(&signal).await.unwrap_err();
    assert!(matches!(err, ExecutionError::Rejected(_)));
    assert_eq!(gateway.orders_placed(), 0);
}
