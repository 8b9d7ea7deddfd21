//! Outcome of one scan cycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::models::signal::Signal;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolFailure {
    pub symbol: String,
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub interval: String,
    pub scanned_at: DateTime<Utc>,
    pub symbols_scanned: usize,
    /// Signals that passed the quality filter, ranked best first
    pub accepted: Vec<Signal>,
    pub top_n: usize,
    /// Candidates dropped by the builder or by the quality filter
    pub rejected: usize,
    /// Symbols analysed without any strategy condition firing
    pub no_signal: usize,
    pub failures: Vec<SymbolFailure>,
}

impl ScanResult {
    pub fn top(&self) -> &[Signal] {
        &self.accepted[..self.top_n.min(self.accepted.len())]
    }

    pub fn others(&self) -> &[Signal] {
        &self.accepted[self.top_n.min(self.accepted.len())..]
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn failures_of(&self, kind: ErrorKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }
}
