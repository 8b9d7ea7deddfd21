//! Concurrent universe scan.
//!
//! One tokio task per symbol, gated by a semaphore sized to the configured
//! worker count. Each task fetches and analyses its symbol independently;
//! a single collector drains the task set and ranks what comes back.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::ScanConfig;
use crate::core::ranking::{apply_quality_filter, rank_signals};
use crate::error::{ErrorKind, ScanError};
use crate::metrics::Metrics;
use crate::models::indicators::PriceSeries;
use crate::models::scan::{ScanResult, SymbolFailure};
use crate::models::signal::Signal;
use crate::services::market_data::{DataUnavailable, MarketDataSource};
use crate::signals::engine::SignalEngine;
use crate::signals::trend::TrendClassifier;

enum SymbolOutcome {
    Analysed { signals: Vec<Signal>, rejected: usize },
    Failed(SymbolFailure),
}

pub struct Scanner {
    source: Arc<dyn MarketDataSource>,
    trend: Arc<TrendClassifier>,
    config: Arc<ScanConfig>,
    metrics: Option<Arc<Metrics>>,
}

impl Scanner {
    /// Validates `config` up front so a bad deployment never starts scanning
    pub fn new(source: Arc<dyn MarketDataSource>, config: ScanConfig) -> Result<Self, ScanError> {
        config.validate()?;
        let trend = Arc::new(TrendClassifier::new(source.clone(), &config));
        Ok(Self {
            source,
            trend,
            config: Arc::new(config),
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Lists the universe through the data source, then scans it.
    ///
    /// Listing is the only step whose failure fails the whole scan.
    pub async fn scan_universe(&self) -> Result<ScanResult, ScanError> {
        let symbols = tokio::time::timeout(
            self.config.fetch_timeout,
            self.source.list_instruments(&self.config.universe),
        )
        .await
        .map_err(|_| DataUnavailable::Timeout(self.config.fetch_timeout.as_millis() as u64))??;

        info!(
            symbol_count = symbols.len(),
            "Scanner: universe contains {} instruments",
            symbols.len()
        );
        Ok(self.scan(&symbols).await)
    }

    /// Scans `symbols`. Per-symbol failures are recorded, never propagated.
    pub async fn scan(&self, symbols: &[String]) -> ScanResult {
        let started = Instant::now();
        let scanned_at = Utc::now();
        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let mut tasks = JoinSet::new();
        let mut task_symbols = HashMap::new();

        for symbol in symbols {
            let symbol = symbol.clone();
            let semaphore = semaphore.clone();
            let source = self.source.clone();
            let trend = self.trend.clone();
            let config = self.config.clone();
            let task_symbol = symbol.clone();

            let handle = tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return SymbolOutcome::Failed(SymbolFailure {
                        symbol,
                        kind: ErrorKind::Configuration,
                        message: "worker pool closed".to_string(),
                    });
                };
                match analyze_symbol(&*source, &trend, &config, &symbol, scanned_at).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(
                            symbol = %symbol,
                            kind = e.kind().as_str(),
                            error = %e,
                            "Scanner: skipping {}: {}",
                            symbol,
                            e
                        );
                        SymbolOutcome::Failed(SymbolFailure {
                            symbol,
                            kind: e.kind(),
                            message: e.to_string(),
                        })
                    }
                }
            });
            task_symbols.insert(handle.id(), task_symbol);
        }

        let mut candidates = Vec::new();
        let mut rejected = 0;
        let mut no_signal = 0;
        let mut failures = Vec::new();

        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, SymbolOutcome::Analysed {
                    signals,
                    rejected: dropped,
                })) => {
                    if signals.is_empty() && dropped == 0 {
                        no_signal += 1;
                    }
                    rejected += dropped;
                    candidates.extend(signals);
                }
                Ok((_, SymbolOutcome::Failed(failure))) => failures.push(failure),
                Err(e) => {
                    let symbol = task_symbols
                        .remove(&e.id())
                        .unwrap_or_else(|| "unknown".to_string());
                    error!(symbol = %symbol, error = %e, "Scanner: analysis task for {} aborted: {}", symbol, e);
                    failures.push(SymbolFailure {
                        symbol,
                        kind: ErrorKind::ComputationDegenerate,
                        message: e.to_string(),
                    });
                }
            }
        }

        failures.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        let (kept, filtered) = apply_quality_filter(candidates, &self.config.quality);
        let accepted = rank_signals(kept);
        let result = ScanResult {
            interval: self.config.interval.clone(),
            scanned_at,
            symbols_scanned: symbols.len(),
            accepted,
            top_n: self.config.top_n,
            rejected: rejected + filtered,
            no_signal,
            failures,
        };

        let elapsed = started.elapsed().as_secs_f64();
        info!(
            symbols = result.symbols_scanned,
            accepted = result.accepted_count(),
            rejected = result.rejected,
            no_signal = result.no_signal,
            failed = result.failure_count(),
            elapsed_seconds = elapsed,
            "Scanner: scan of {} symbols finished with {} accepted signals",
            result.symbols_scanned,
            result.accepted_count()
        );

        if let Some(ref metrics) = self.metrics {
            metrics.record_scan(&result, elapsed);
        }
        result
    }
}

async fn analyze_symbol(
    source: &dyn MarketDataSource,
    trend: &TrendClassifier,
    config: &ScanConfig,
    symbol: &str,
    timestamp: DateTime<Utc>,
) -> Result<SymbolOutcome, ScanError> {
    let bars = tokio::time::timeout(
        config.fetch_timeout,
        source.fetch_bars(symbol, &config.interval, config.bar_limit),
    )
    .await
    .map_err(|_| DataUnavailable::Timeout(config.fetch_timeout.as_millis() as u64))??;

    let series = PriceSeries::new(symbol, config.interval.clone(), bars);
    series.require(config.warmup_bars)?;

    let votes = trend.votes(symbol).await;
    let analysis = SignalEngine::analyze(&series, &votes, timestamp, config)?;

    debug!(
        symbol = %symbol,
        regime = %analysis.reading.primary,
        signals = analysis.signals.len(),
        rejected = analysis.rejections.len(),
        "Scanner: analysed {}",
        symbol
    );

    Ok(SymbolOutcome::Analysed {
        rejected: analysis.rejections.len(),
        signals: analysis.signals,
    })
}
