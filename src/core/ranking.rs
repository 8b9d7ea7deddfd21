//! Quality filter and deterministic ranking of accepted signals

use std::cmp::Ordering;

use crate::config::QualityFilter;
use crate::models::signal::Signal;

pub fn passes_quality(signal: &Signal, filter: &QualityFilter) -> bool {
    signal.score >= filter.min_score
        && signal.risk_reward() >= filter.min_risk_reward
        && signal.confidence >= filter.min_confidence
}

/// Splits candidates into (kept, dropped count)
pub fn apply_quality_filter(signals: Vec<Signal>, filter: &QualityFilter) -> (Vec<Signal>, usize) {
    let before = signals.len();
    let kept: Vec<Signal> = signals
        .into_iter()
        .filter(|s| passes_quality(s, filter))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Score desc, confidence desc, symbol asc, strategy label asc
pub fn compare_signals(a: &Signal, b: &Signal) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.confidence.total_cmp(&a.confidence))
        .then_with(|| a.symbol.cmp(&b.symbol))
        .then_with(|| a.strategy.label().cmp(b.strategy.label()))
        .then_with(|| a.side.as_str().cmp(b.side.as_str()))
}

/// Orders the accepted set; the result does not depend on input order
pub fn rank_signals(mut signals: Vec<Signal>) -> Vec<Signal> {
    signals.sort_by(compare_signals);
    signals
}
