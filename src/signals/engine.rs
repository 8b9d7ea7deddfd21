//! Per-symbol analysis: indicators → regime → strategy → signals

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::models::indicators::{IndicatorSet, IndicatorSnapshot, PriceSeries};
use crate::models::signal::{Regime, Side, Signal, StrategyKind};
use crate::signals::builder::{Rejection, SignalBuilder, SignalRequest};
use crate::signals::regime::{RegimeClassifier, RegimeReading};
use crate::signals::trend::TrendVotes;

/// Side/strategy pair that fired on the last bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub side: Side,
    pub strategy: StrategyKind,
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub reading: RegimeReading,
    pub signals: Vec<Signal>,
    pub rejections: Vec<(StrategyKind, Rejection)>,
}

impl Analysis {
    /// No strategy condition fired at all
    pub fn is_quiet(&self) -> bool {
        self.signals.is_empty() && self.rejections.is_empty()
    }
}

/// Strategies whose entry condition holds for this reading.
///
/// The primary regime contributes at most one candidate; the reversal
/// overlay can add a second one in the same cycle.
pub fn select_candidates(
    reading: &RegimeReading,
    snapshot: &IndicatorSnapshot,
    config: &ScanConfig,
) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(2);
    let market_side = reading.market_trend.side();

    let primary = match reading.primary {
        Regime::Trend => market_side
            .filter(|side| match side {
                Side::Long => snapshot.ema_fast > snapshot.ema_slow,
                Side::Short => snapshot.ema_fast < snapshot.ema_slow,
            })
            .map(|side| (side, StrategyKind::TrendFollow)),
        Regime::MeanReversion => {
            if snapshot.rsi < config.regime.rsi_oversold {
                Some((Side::Long, StrategyKind::MeanReversion))
            } else if snapshot.rsi > config.regime.rsi_overbought {
                Some((Side::Short, StrategyKind::MeanReversion))
            } else {
                None
            }
        }
        Regime::Scalp => market_side
            .filter(|_| snapshot.volume_spike)
            .map(|side| (side, StrategyKind::ScalpBreakout)),
        Regime::Reversal => None,
    };

    if let Some((side, strategy)) = primary {
        candidates.push(Candidate { side, strategy });
    }
    if let Some(side) = reading.reversal {
        candidates.push(Candidate {
            side,
            strategy: StrategyKind::Reversal,
        });
    }
    candidates
}

pub struct SignalEngine;

impl SignalEngine {
    /// Analyses one symbol's primary series against its trend votes.
    ///
    /// Fails only when the series is too short for the configured warm-up.
    pub fn analyze(
        series: &PriceSeries,
        votes: &TrendVotes,
        timestamp: DateTime<Utc>,
        config: &ScanConfig,
    ) -> Result<Analysis, ScanError> {
        series.require(config.warmup_bars)?;

        let indicators = IndicatorSet::compute(series, &config.indicators)?;
        let snapshot = indicators.snapshot()?;
        let reading = RegimeClassifier::classify(&snapshot, &config.regime);
        let builder = SignalBuilder::from_config(config);

        let mut signals = Vec::new();
        let mut rejections = Vec::new();

        for candidate in select_candidates(&reading, &snapshot, config) {
            let request = SignalRequest {
                symbol: series.symbol(),
                side: candidate.side,
                strategy: candidate.strategy,
                trend: reading.market_trend,
                snapshot: &snapshot,
                votes,
                timestamp,
            };
            match builder.try_build(&request) {
                Ok(signal) => signals.push(signal),
                Err(rejection) => {
                    debug!(
                        symbol = %series.symbol(),
                        strategy = %candidate.strategy,
                        reason = %rejection,
                        "Rejected {} candidate for {}: {}",
                        candidate.strategy,
                        series.symbol(),
                        rejection
                    );
                    rejections.push((candidate.strategy, rejection));
                }
            }
        }

        Ok(Analysis {
            reading,
            signals,
            rejections,
        })
    }
}
