//! Scripted market data and fixtures shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::DateTime;
use perpscan::config::{QualityFilter, ScanConfig};
use perpscan::models::indicators::Candle;
use perpscan::services::market_data::{DataUnavailable, InstrumentFilter, MarketDataSource};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// How a scripted symbol answers every bar request
#[derive(Debug, Clone)]
pub enum Script {
    Closes(Vec<f64>),
    Fail(DataUnavailable),
    Slow(Duration, Vec<f64>),
    /// Fails on the named interval, answers with the closes elsewhere
    FailOn(String, Vec<f64>),
    Panic,
}

/// In-memory data source keyed by symbol
pub struct ScriptedSource {
    scripts: HashMap<String, Script>,
    listing: Result<Vec<String>, DataUnavailable>,
    requests: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            listing: Ok(Vec::new()),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, symbol: &str, script: Script) -> Self {
        self.scripts.insert(symbol.to_string(), script);
        self
    }

    pub fn with_listing(mut self, listing: Result<Vec<String>, DataUnavailable>) -> Self {
        self.listing = listing;
        self
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataSource for ScriptedSource {
    async fn fetch_bars(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, DataUnavailable> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let closes = match self.scripts.get(symbol) {
            Some(Script::Closes(closes)) => closes,
            Some(Script::Fail(err)) => return Err(err.clone()),
            Some(Script::Slow(delay, closes)) => {
                tokio::time::sleep(*delay).await;
                closes
            }
            Some(Script::FailOn(failing, _)) if failing == interval => {
                return Err(DataUnavailable::Http(format!("{} {} unavailable", symbol, interval)))
            }
            Some(Script::FailOn(_, closes)) => closes,
            Some(Script::Panic) => panic!("bar feed for {} crashed", symbol),
            None => return Err(DataUnavailable::NotFound(symbol.to_string())),
        };
        let start = closes.len().saturating_sub(limit);
        Ok(candles(&closes[start..]))
    }

    async fn list_instruments(
        &self,
        filter: &InstrumentFilter,
    ) -> Result<Vec<String>, DataUnavailable> {
        let symbols = self.listing.clone()?;
        Ok(symbols
            .into_iter()
            .take(filter.limit.unwrap_or(usize::MAX))
            .collect())
    }
}

pub fn candles(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let timestamp = DateTime::from_timestamp(1_700_000_000 + i as i64 * 3600, 0)
                .expect("valid timestamp");
            Candle::new(close, close + 0.5, close - 0.5, close, 1000.0, timestamp)
        })
        .collect()
}

pub fn rising(count: usize) -> Vec<f64> {
    (0..count).map(|i| 100.0 + i as f64).collect()
}

pub fn falling(count: usize) -> Vec<f64> {
    (0..count).map(|i| 300.0 - i as f64).collect()
}

/// Price ping-ponging between two levels; no strategy fires on it
pub fn choppy(count: usize) -> Vec<f64> {
    (0..count)
        .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
        .collect()
}

/// Defaults with a short fetch timeout and no score floor
pub fn test_config() -> ScanConfig {
    ScanConfig {
        workers: 4,
        fetch_timeout: Duration::from_millis(200),
        quality: QualityFilter {
            min_score: 0.0,
            ..QualityFilter::default()
        },
        ..ScanConfig::default()
    }
}

pub fn symbols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
