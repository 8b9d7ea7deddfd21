//! Paper-trading bookkeeping over explicit ledger state

pub mod ledger;

pub use ledger::{LedgerConfig, LedgerState, PaperLedger, PaperTrade};
