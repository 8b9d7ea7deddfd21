//! Market data source interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::indicators::Candle;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataUnavailable {
    #[error("http error: {0}")]
    Http(String),

    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("unknown symbol or interval: {0}")]
    NotFound(String),
}

impl DataUnavailable {
    /// Worth retrying inside the same request
    pub fn is_transient(&self) -> bool {
        matches!(self, DataUnavailable::Http(_) | DataUnavailable::Timeout(_))
    }
}

/// Which instruments make up the scan universe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentFilter {
    pub quote_asset: String,
    pub perpetual_only: bool,
    /// Keep at most this many symbols, in listing order
    pub limit: Option<usize>,
}

impl Default for InstrumentFilter {
    fn default() -> Self {
        Self {
            quote_asset: "USDT".to_string(),
            perpetual_only: true,
            limit: None,
        }
    }
}

#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Most recent `limit` bars for `symbol` on `interval`, oldest first
    async fn fetch_bars(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, DataUnavailable>;

    async fn list_instruments(
        &self,
        filter: &InstrumentFilter,
    ) -> Result<Vec<String>, DataUnavailable>;
}
