//! perpscan worker
//!
//! Runs a scan cycle on a cron schedule until interrupted. Optional paper
//! trading (`PAPER_TRADING=true`) and dry-run execution
//! (`EXECUTE_TRADES=true`).

use dotenvy::dotenv;
use perpscan::bookkeeping::{LedgerConfig, PaperLedger};
use perpscan::config::{self, ScanConfig};
use perpscan::core::{ScanScheduler, Scanner};
use perpscan::jobs::{run_cycle, CycleContext};
use perpscan::logging;
use perpscan::metrics::Metrics;
use perpscan::services::{
    BinanceFuturesClient, DiscordWebhookNotifier, DryRunGateway, JsonFileStore, LogNotifier,
    MarketDataSource, Notifier, TextReportExporter,
};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let scan_interval = config::get_scan_every_seconds()?;

    let env = config::get_environment();
    info!("Starting perpscan worker");
    info!(environment = %env, "Environment");

    let metrics = Arc::new(Metrics::new()?);
    let scan_config = ScanConfig::from_env()?;
    let top_n = scan_config.top_n;

    let source: Arc<dyn MarketDataSource> = Arc::new(BinanceFuturesClient::new(
        &config::get_binance_url(),
        scan_config.fetch_timeout,
    )?);
    let scanner = Arc::new(Scanner::new(source, scan_config)?.with_metrics(metrics.clone()));

    let notifier: Arc<dyn Notifier> = match config::get_discord_webhook_url() {
        Some(url) => Arc::new(DiscordWebhookNotifier::new(url)),
        None => Arc::new(LogNotifier),
    };

    let mut ctx = CycleContext::new(notifier)
        .with_store(Arc::new(JsonFileStore::new(config::get_state_dir())))
        .with_exporter(Box::new(TextReportExporter::new(top_n)))
        .with_report_dir(config::get_report_dir())
        .with_metrics(metrics.clone());
    if config::paper_trading_enabled() {
        info!("Paper trading enabled");
        ctx = ctx.with_ledger(PaperLedger::new(LedgerConfig::default()));
    }
    if config::execute_trades_enabled() {
        info!("Trade execution enabled (dry run)");
        ctx = ctx.with_gateway(Arc::new(DryRunGateway::new()));
    }
    let ctx = Arc::new(ctx);

    let scheduler = ScanScheduler::new(scan_interval)?;
    let cycle_metrics = metrics.clone();
    scheduler
        .start(move || {
            let scanner = scanner.clone();
            let ctx = ctx.clone();
            let metrics = cycle_metrics.clone();
            async move {
                match run_cycle(&scanner, &ctx).await {
                    Ok(_) => {
                        tracing::debug!(metrics = %metrics.gather_text(), "Metrics after cycle");
                    }
                    Err(e) => error!(error = %e, "Scan cycle failed: {}", e),
                }
            }
        })
        .await;

    info!(interval = scan_interval, cron = %scheduler.cron(), "Worker started, waiting for shutdown signal...");
    signal::ctrl_c().await?;
    info!("Shutting down worker...");
    scheduler.stop().await;
    info!("Worker stopped");

    Ok(())
}
