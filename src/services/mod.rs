//! External collaborators: market data, notification, persistence,
//! execution and reporting.

pub mod binance;
pub mod execution;
pub mod market_data;
pub mod notifier;
pub mod persistence;
pub mod report;

pub use binance::BinanceFuturesClient;
pub use execution::{DryRunGateway, ExecutionError, ExecutionGateway};
pub use market_data::{DataUnavailable, InstrumentFilter, MarketDataSource};
pub use notifier::{DiscordWebhookNotifier, LogNotifier, Notifier, NotifyError};
pub use persistence::{JsonFileStore, MemoryStore, PersistenceError, PersistenceStore};
pub use report::{JsonReportExporter, ReportArtifact, ReportError, ReportExporter, TextReportExporter};
