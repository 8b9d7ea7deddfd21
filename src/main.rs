//! perpscan
//!
//! Runs a single scan cycle over the Binance USDT-M perpetual universe,
//! publishes the top signals and writes the reports.

use dotenvy::dotenv;
use perpscan::config::{self, ScanConfig};
use perpscan::core::Scanner;
use perpscan::jobs::{run_cycle, CycleContext};
use perpscan::logging;
use perpscan::services::{
    BinanceFuturesClient, DiscordWebhookNotifier, JsonReportExporter, LogNotifier,
    MarketDataSource, Notifier, TextReportExporter,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let env = config::get_environment();
    info!(environment = %env, "Starting perpscan");

    let scan_config = ScanConfig::from_env()?;
    let source: Arc<dyn MarketDataSource> = Arc::new(BinanceFuturesClient::new(
        &config::get_binance_url(),
        scan_config.fetch_timeout,
    )?);

    let notifier: Arc<dyn Notifier> = match config::get_discord_webhook_url() {
        Some(url) => Arc::new(DiscordWebhookNotifier::new(url)),
        None => {
            info!("DISCORD_WEBHOOK_URL not set, logging signals instead");
            Arc::new(LogNotifier)
        }
    };

    let top_n = scan_config.top_n;
    let scanner = Scanner::new(source, scan_config)?;
    let ctx = CycleContext::new(notifier)
        .with_exporter(Box::new(TextReportExporter::new(top_n)))
        .with_exporter(Box::new(JsonReportExporter))
        .with_report_dir(config::get_report_dir());

    let (result, summary) = run_cycle(&scanner, &ctx).await?;

    println!(
        "Scanned {} symbols: {} accepted, {} rejected, {} without a setup, {} failed",
        result.symbols_scanned,
        result.accepted_count(),
        result.rejected,
        result.no_signal,
        result.failure_count()
    );
    for path in &summary.reports {
        println!("Report: {}", path.display());
    }

    Ok(())
}
