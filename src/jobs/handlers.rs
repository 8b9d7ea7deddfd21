//! Post-scan handling: notify, paper-trade, execute, persist, report

use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::core::scanner::Scanner;
use crate::error::ScanError;
use crate::jobs::context::CycleContext;
use crate::models::scan::ScanResult;
use crate::models::signal::Signal;
use crate::services::notifier::publish_signals;

/// What one cycle delivered downstream
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleSummary {
    pub notified: usize,
    pub paper_trades: usize,
    pub orders: Vec<String>,
    pub persisted: usize,
    pub reports: Vec<PathBuf>,
}

/// Store key for a signal's history
pub fn signal_key(signal: &Signal) -> String {
    format!("signals_{}", signal.symbol)
}

pub fn report_title(result: &ScanResult) -> String {
    format!(
        "{} scan {}",
        result.interval,
        result.scanned_at.format("%Y-%m-%d %H%M")
    )
}

/// Hands the top signals of `result` to every configured collaborator.
///
/// Collaborator failures are logged and never abort the remaining steps.
pub async fn handle_scan_result(result: &ScanResult, ctx: &CycleContext) -> CycleSummary {
    let top = result.top();
    let mut summary = CycleSummary::default();

    if top.is_empty() {
        info!(interval = %result.interval, "No signals passed the quality filter this cycle");
    }

    summary.notified = publish_signals(ctx.notifier.as_ref(), top).await;
    if let Some(ref metrics) = ctx.metrics {
        metrics.notifications_sent_total.inc_by(summary.notified as u64);
    }

    if let Some(ref ledger) = ctx.ledger {
        match ctx.store {
            Some(ref store) => match ledger.load(store.as_ref()).await {
                Ok(mut state) => {
                    for signal in top {
                        let Some(trade) = ledger.simulate(&mut state, signal) else {
                            continue;
                        };
                        match ledger.commit(store.as_ref(), &state, &trade).await {
                            Ok(()) => summary.paper_trades += 1,
                            Err(e) => {
                                error!(symbol = %signal.symbol, error = %e, "Failed to record paper trade for {}", signal.symbol);
                            }
                        }
                    }
                }
                Err(e) => error!(error = %e, "Failed to load paper ledger: {}", e),
            },
            None => warn!("Paper trading enabled without a persistence store, skipping"),
        }
    }

    if let Some(ref gateway) = ctx.gateway {
        for signal in top {
            match gateway.place_order(signal).await {
                Ok(order_id) => summary.orders.push(order_id),
                Err(e) => {
                    warn!(symbol = %signal.symbol, error = %e, "Order for {} failed: {}", signal.symbol, e);
                }
            }
        }
    }

    if let Some(ref store) = ctx.store {
        for signal in top {
            let record = match serde_json::to_value(signal) {
                Ok(record) => record,
                Err(e) => {
                    error!(symbol = %signal.symbol, error = %e, "Failed to encode signal for {}", signal.symbol);
                    continue;
                }
            };
            match store.append(&signal_key(signal), record).await {
                Ok(()) => summary.persisted += 1,
                Err(e) => {
                    error!(symbol = %signal.symbol, error = %e, "Failed to persist signal for {}", signal.symbol);
                }
            }
        }
    }

    if !ctx.exporters.is_empty() {
        let title = report_title(result);
        for exporter in &ctx.exporters {
            let artifact = match exporter.render(&result.accepted, &title) {
                Ok(artifact) => artifact,
                Err(e) => {
                    error!(error = %e, "Failed to render report: {}", e);
                    continue;
                }
            };
            let Some(ref dir) = ctx.report_dir else {
                debug!(file = %artifact.file_name, "No report directory configured, discarding {}", artifact.file_name);
                continue;
            };
            match artifact.write_to(dir).await {
                Ok(path) => {
                    info!(path = %path.display(), "Report written to {}", path.display());
                    summary.reports.push(path);
                }
                Err(e) => error!(error = %e, "Failed to write report: {}", e),
            }
        }
    }

    summary
}

/// Scans the universe and handles the result
pub async fn run_cycle(scanner: &Scanner, ctx: &CycleContext) -> Result<(ScanResult, CycleSummary), ScanError> {
    let result = scanner.scan_universe().await?;
    let summary = handle_scan_result(&result, ctx).await;
    info!(
        notified = summary.notified,
        paper_trades = summary.paper_trades,
        orders = summary.orders.len(),
        persisted = summary.persisted,
        reports = summary.reports.len(),
        "Cycle complete"
    );
    Ok((result, summary))
}
