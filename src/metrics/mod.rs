//! Prometheus metrics for scan cycles

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::error::ErrorKind;
use crate::models::scan::ScanResult;

pub struct Metrics {
    pub registry: Registry,
    pub scans_total: IntCounter,
    pub symbols_scanned_total: IntCounter,
    pub signals_accepted_total: IntCounter,
    pub signals_rejected_total: IntCounter,
    pub symbol_failures_total: IntCounterVec,
    pub notifications_sent_total: IntCounter,
    pub scan_duration_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let scans_total = IntCounter::new("perpscan_scans_total", "Completed scan cycles")?;
        let symbols_scanned_total =
            IntCounter::new("perpscan_symbols_scanned_total", "Symbols analysed")?;
        let signals_accepted_total = IntCounter::new(
            "perpscan_signals_accepted_total",
            "Signals that passed the quality filter",
        )?;
        let signals_rejected_total = IntCounter::new(
            "perpscan_signals_rejected_total",
            "Candidates rejected by the builder or the quality filter",
        )?;
        let symbol_failures_total = IntCounterVec::new(
            Opts::new("perpscan_symbol_failures_total", "Per-symbol failures"),
            &["kind"],
        )?;
        let notifications_sent_total = IntCounter::new(
            "perpscan_notifications_sent_total",
            "Signal notifications delivered",
        )?;
        let scan_duration_seconds = Histogram::with_opts(
            HistogramOpts::new("perpscan_scan_duration_seconds", "Scan cycle duration")
                .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        )?;

        registry.register(Box::new(scans_total.clone()))?;
        registry.register(Box::new(symbols_scanned_total.clone()))?;
        registry.register(Box::new(signals_accepted_total.clone()))?;
        registry.register(Box::new(signals_rejected_total.clone()))?;
        registry.register(Box::new(symbol_failures_total.clone()))?;
        registry.register(Box::new(notifications_sent_total.clone()))?;
        registry.register(Box::new(scan_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            scans_total,
            symbols_scanned_total,
            signals_accepted_total,
            signals_rejected_total,
            symbol_failures_total,
            notifications_sent_total,
            scan_duration_seconds,
        })
    }

    /// Folds one finished scan into the counters
    pub fn record_scan(&self, result: &ScanResult, elapsed_seconds: f64) {
        self.scans_total.inc();
        self.symbols_scanned_total.inc_by(result.symbols_scanned as u64);
        self.signals_accepted_total.inc_by(result.accepted.len() as u64);
        self.signals_rejected_total.inc_by(result.rejected as u64);
        for failure in &result.failures {
            self.record_failure(failure.kind);
        }
        self.scan_duration_seconds.observe(elapsed_seconds);
    }

    pub fn record_failure(&self, kind: ErrorKind) {
        self.symbol_failures_total
            .with_label_values(&[kind.as_str()])
            .inc();
    }

    /// Text exposition format
    pub fn gather_text(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if encoder.encode(&self.registry.gather(), &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
