//! Risk-managed signal construction.
//!
//! Turns a side/strategy decision on the last bar into a full [`Signal`]:
//! liquidation-aware stop, target, position size, confidence and score.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::common::math;
use crate::config::{ConfidenceParams, RiskParams, ScanConfig, ScoreWeights, TargetPolicy};
use crate::models::indicators::IndicatorSnapshot;
use crate::models::signal::{Side, Signal, StrategyKind, Trend};
use crate::signals::scoring::{composite_score, ScoreInputs};
use crate::signals::trend::{is_trade_allowed, Confluence, TrendVotes};

/// Why a candidate did not become a signal
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum Rejection {
    #[error("entry price {0} is not a positive number")]
    InvalidEntry(f64),

    #[error("risk per unit is not positive")]
    ZeroRisk,

    #[error("reward per unit is not positive")]
    ZeroReward,

    #[error("position size rounds to zero")]
    ZeroSize,

    #[error("stop does not sit between liquidation and entry")]
    StopOutOfRange,

    #[error("{side} vetoed by higher-timeframe trend")]
    CounterTrend { side: Side },
}

/// One candidate on the last bar of a symbol's primary series
#[derive(Debug, Clone, Copy)]
pub struct SignalRequest<'a> {
    pub symbol: &'a str,
    pub side: Side,
    pub strategy: StrategyKind,
    pub trend: Trend,
    pub snapshot: &'a IndicatorSnapshot,
    pub votes: &'a TrendVotes,
    pub timestamp: DateTime<Utc>,
}

/// Price where a position at `leverage` loses its whole margin
pub fn liquidation_price(entry: f64, side: Side, leverage: f64) -> f64 {
    entry * (1.0 - side.sign() / leverage)
}

/// Percentage stop clamped toward the solvent side of liquidation
pub fn clamped_stop(entry: f64, side: Side, liquidation: f64, risk: &RiskParams) -> f64 {
    let candidate = entry * (1.0 - side.sign() * risk.stop_pct);
    match side {
        Side::Long => candidate.max(liquidation * (1.0 + risk.safety_margin)),
        Side::Short => candidate.min(liquidation * (1.0 - risk.safety_margin)),
    }
}

pub fn target_price(entry: f64, side: Side, risk_per_unit: f64, policy: TargetPolicy) -> f64 {
    match policy {
        TargetPolicy::RiskReward(multiple) => entry + side.sign() * multiple * risk_per_unit,
        TargetPolicy::FixedPercent(pct) => entry * (1.0 + side.sign() * pct),
    }
}

/// Strategy base confidence shifted by net vote agreement, clamped to [0, 100]
pub fn confidence(strategy: StrategyKind, confluence: &Confluence, params: &ConfidenceParams) -> f64 {
    let base = match strategy {
        StrategyKind::TrendFollow => params.trend,
        StrategyKind::MeanReversion => params.mean_reversion,
        StrategyKind::ScalpBreakout => params.scalp,
        StrategyKind::Reversal => params.reversal,
    };
    (base + params.confluence_adjustment * confluence.net() as f64).clamp(0.0, 100.0)
}

pub struct SignalBuilder<'a> {
    risk: &'a RiskParams,
    confidence: &'a ConfidenceParams,
    weights: &'a ScoreWeights,
}

impl<'a> SignalBuilder<'a> {
    pub fn new(
        risk: &'a RiskParams,
        confidence: &'a ConfidenceParams,
        weights: &'a ScoreWeights,
    ) -> Self {
        Self {
            risk,
            confidence,
            weights,
        }
    }

    pub fn from_config(config: &'a ScanConfig) -> Self {
        Self::new(&config.risk, &config.confidence, &config.weights)
    }

    /// Builds the signal or says why not
    pub fn try_build(&self, request: &SignalRequest<'_>) -> Result<Signal, Rejection> {
        let side = request.side;
        let entry = request.snapshot.close;
        if !(entry.is_finite() && entry > 0.0) {
            return Err(Rejection::InvalidEntry(entry));
        }

        let liquidation = liquidation_price(entry, side, self.risk.leverage);
        let stop = clamped_stop(entry, side, liquidation, self.risk);

        let risk_per_unit = side.sign() * (entry - stop);
        if !(risk_per_unit > 0.0) {
            return Err(Rejection::ZeroRisk);
        }

        let target = target_price(entry, side, risk_per_unit, self.risk.target);
        let reward_per_unit = side.sign() * (target - entry);
        if !(reward_per_unit > 0.0) {
            return Err(Rejection::ZeroReward);
        }

        let position_size = math::round_to(
            self.risk.risk_budget / risk_per_unit,
            self.risk.size_precision,
        );
        if !(position_size > 0.0) {
            return Err(Rejection::ZeroSize);
        }

        let confluence = Confluence::for_side(side, request.votes);
        let confidence = confidence(request.strategy, &confluence, self.confidence);
        let risk_reward = math::round_to(reward_per_unit / risk_per_unit, 2);

        let score = composite_score(
            &ScoreInputs {
                side,
                confluence,
                rsi: request.snapshot.rsi,
                macd_histogram: request.snapshot.macd_histogram,
                close: entry,
                bollinger: request.snapshot.bollinger,
                volume_spike: request.snapshot.volume_spike,
                confidence,
                risk_reward,
            },
            self.weights,
        );

        if !is_trade_allowed(side, request.votes) {
            return Err(Rejection::CounterTrend { side });
        }

        let signal = Signal {
            symbol: request.symbol.to_string(),
            side,
            entry,
            stop,
            target,
            liquidation,
            position_size,
            confidence,
            score,
            regime: request.strategy.regime(),
            trend: request.trend,
            strategy: request.strategy,
            timestamp: request.timestamp,
        };

        if !signal.is_well_formed() {
            return Err(Rejection::StopOutOfRange);
        }
        Ok(signal)
    }

    /// `None` for any rejected candidate
    pub fn build(&self, request: &SignalRequest<'_>) -> Option<Signal> {
        self.try_build(request).ok()
    }
}
