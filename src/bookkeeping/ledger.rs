//! Paper-trading ledger.
//!
//! State is an explicit [`LedgerState`] value loaded from and committed to a
//! [`PersistenceStore`]; the ledger itself holds only its configuration.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::common::math;
use crate::models::signal::{Side, Signal, StrategyKind};
use crate::services::persistence::{PersistenceError, PersistenceStore};

pub const TRADES_KEY: &str = "paper_trades";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub start_capital: f64,
    /// Fraction of the balance risked per trade
    pub risk_fraction: f64,
    /// Trading pauses once today's realized losses reach this share of the balance
    pub max_daily_loss_pct: f64,
    pub qty_precision: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            start_capital: 10.0,
            risk_fraction: 0.02,
            max_daily_loss_pct: 15.0,
            qty_precision: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperTrade {
    pub symbol: String,
    pub side: Side,
    pub strategy: StrategyKind,
    pub entry: f64,
    pub exit: f64,
    pub qty: f64,
    pub pnl: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LedgerState {
    pub balance: f64,
    pub trades: Vec<PaperTrade>,
}

impl LedgerState {
    pub fn new(balance: f64) -> Self {
        Self {
            balance,
            trades: Vec::new(),
        }
    }

    /// Today's realized losses as a percentage of the current balance
    pub fn loss_pct_on(&self, day: NaiveDate) -> f64 {
        if self.balance <= 0.0 {
            return 100.0;
        }
        let loss: f64 = self
            .trades
            .iter()
            .filter(|t| t.timestamp.date_naive() == day && t.pnl < 0.0)
            .map(|t| t.pnl)
            .sum();
        math::round_to(-loss / self.balance * 100.0, 2)
    }
}

pub struct PaperLedger {
    config: LedgerConfig,
}

impl PaperLedger {
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn is_paused(&self, state: &LedgerState, day: NaiveDate) -> bool {
        state.loss_pct_on(day) >= self.config.max_daily_loss_pct
    }

    /// Simulates a fill at the signal's target and applies it to `state`.
    ///
    /// Fills at target never lose, so the daily-loss pause only acts on
    /// losing trades that reach the ledger state some other way (loaded
    /// from the store or recorded by hand).
    ///
    /// Returns `None` when trading is paused or the quantity rounds to zero.
    pub fn simulate(&self, state: &mut LedgerState, signal: &Signal) -> Option<PaperTrade> {
        let day = signal.timestamp.date_naive();
        if self.is_paused(state, day) {
            warn!(
                symbol = %signal.symbol,
                loss_pct = state.loss_pct_on(day),
                "Paper trading paused, daily loss limit reached"
            );
            return None;
        }

        let risk_per_unit = signal.risk_per_unit();
        if risk_per_unit <= 0.0 {
            return None;
        }
        let risk_amount = state.balance * self.config.risk_fraction;
        let qty = math::round_to(risk_amount / risk_per_unit, self.config.qty_precision);
        if qty <= 0.0 {
            return None;
        }

        let pnl = math::round_to(signal.side.sign() * (signal.target - signal.entry) * qty, 4);
        state.balance = math::round_to(state.balance + pnl, 4);

        let trade = PaperTrade {
            symbol: signal.symbol.clone(),
            side: signal.side,
            strategy: signal.strategy,
            entry: signal.entry,
            exit: signal.target,
            qty,
            pnl,
            timestamp: signal.timestamp,
        };
        state.trades.push(trade.clone());

        info!(
            symbol = %trade.symbol,
            qty = trade.qty,
            pnl = trade.pnl,
            balance = state.balance,
            "Paper trade {} {}: pnl {} balance {}",
            trade.side,
            trade.symbol,
            trade.pnl,
            state.balance
        );
        Some(trade)
    }

    /// Balance and trade history from `store`, starting capital when empty
    pub async fn load(&self, store: &dyn PersistenceStore) -> Result<LedgerState, PersistenceError> {
        let balance = store
            .read_balance()
            .await?
            .unwrap_or(self.config.start_capital);

        let trades = store
            .records(TRADES_KEY)
            .await?
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<PaperTrade>(record) {
                Ok(trade) => Some(trade),
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable paper trade record");
                    None
                }
            })
            .collect();

        Ok(LedgerState { balance, trades })
    }

    /// Persists one trade and the resulting balance
    pub async fn commit(
        &self,
        store: &dyn PersistenceStore,
        state: &LedgerState,
        trade: &PaperTrade,
    ) -> Result<(), PersistenceError> {
        let record = serde_json::to_value(trade).map_err(|source| PersistenceError::Corrupt {
            path: TRADES_KEY.to_string(),
            source,
        })?;
        store.append(TRADES_KEY, record).await?;
        store.write_balance(state.balance).await
    }
}
