//! Candidate trade model and its closed vocabularies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::math;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// +1 for long, -1 for short
    pub fn sign(&self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Long => "long",
            Side::Short => "short",
        }
    }

    /// Trend that agrees with this side
    pub fn aligned_trend(&self) -> Trend {
        match self {
            Side::Long => Trend::Bullish,
            Side::Short => Trend::Bearish,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Bullish => "bullish",
            Trend::Bearish => "bearish",
            Trend::Neutral => "neutral",
        }
    }

    /// Side a directional trend favours, `None` when neutral
    pub fn side(&self) -> Option<Side> {
        match self {
            Trend::Bullish => Some(Side::Long),
            Trend::Bearish => Some(Side::Short),
            Trend::Neutral => None,
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    Trend,
    MeanReversion,
    Scalp,
    Reversal,
}

impl Regime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::Trend => "trend",
            Regime::MeanReversion => "mean_reversion",
            Regime::Scalp => "scalp",
            Regime::Reversal => "reversal",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    TrendFollow,
    MeanReversion,
    ScalpBreakout,
    Reversal,
}

impl StrategyKind {
    pub fn regime(&self) -> Regime {
        match self {
            StrategyKind::TrendFollow => Regime::Trend,
            StrategyKind::MeanReversion => Regime::MeanReversion,
            StrategyKind::ScalpBreakout => Regime::Scalp,
            StrategyKind::Reversal => Regime::Reversal,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StrategyKind::TrendFollow => "Trend",
            StrategyKind::MeanReversion => "Mean-Reversion",
            StrategyKind::ScalpBreakout => "Scalp Breakout",
            StrategyKind::Reversal => "Reversal",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Risk-managed candidate trade.
///
/// Serializes to a flat record; this is the wire shape consumed by the
/// notifier, persistence, execution and report collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub side: Side,
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
    pub liquidation: f64,
    pub position_size: f64,
    pub confidence: f64,
    pub score: f64,
    pub regime: Regime,
    pub trend: Trend,
    pub strategy: StrategyKind,
    pub timestamp: DateTime<Utc>,
}

impl Signal {
    pub fn risk_per_unit(&self) -> f64 {
        (self.entry - self.stop).abs()
    }

    pub fn reward_per_unit(&self) -> f64 {
        (self.target - self.entry).abs()
    }

    /// Reward ÷ risk rounded to two decimals, 0 when risk is 0
    pub fn risk_reward(&self) -> f64 {
        let risk = self.risk_per_unit();
        if risk == 0.0 {
            return 0.0;
        }
        math::round_to(self.reward_per_unit() / risk, 2)
    }

    /// Capital lost if the stop is hit
    pub fn risk_amount(&self) -> f64 {
        self.position_size * self.risk_per_unit()
    }

    /// Profit if the target is hit
    pub fn forecast_pnl(&self) -> f64 {
        self.position_size * self.reward_per_unit()
    }

    /// Checks the price ladder and size invariants
    pub fn is_well_formed(&self) -> bool {
        let ordered = match self.side {
            Side::Long => {
                self.liquidation < self.stop && self.stop < self.entry && self.entry < self.target
            }
            Side::Short => {
                self.target < self.entry && self.entry < self.stop && self.stop < self.liquidation
            }
        };
        ordered && self.position_size > 0.0
    }
}
