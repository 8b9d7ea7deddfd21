//! Binance USDT-M futures REST client

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::models::indicators::Candle;
use crate::services::market_data::{DataUnavailable, InstrumentFilter, MarketDataSource};

const KLINES_PATH: &str = "/fapi/v1/klines";
const EXCHANGE_INFO_PATH: &str = "/fapi/v1/exchangeInfo";
const MAX_RETRIES: usize = 3;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    symbol: String,
    #[serde(default)]
    contract_type: String,
    #[serde(default)]
    quote_asset: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl SymbolInfo {
    fn matches(&self, filter: &InstrumentFilter) -> bool {
        if filter.perpetual_only && self.contract_type != "PERPETUAL" {
            return false;
        }
        if matches!(self.status.as_deref(), Some(status) if status != "TRADING") {
            return false;
        }
        match &self.quote_asset {
            Some(quote) => quote.eq_ignore_ascii_case(&filter.quote_asset),
            None => self.symbol.ends_with(&filter.quote_asset),
        }
    }
}

pub struct BinanceFuturesClient {
    base_url: Url,
    http: reqwest::Client,
    backoff: ExponentialBuilder,
}

impl BinanceFuturesClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DataUnavailable> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("perpscan")
            .build()
            .map_err(|e| DataUnavailable::Http(e.to_string()))?;
        Self::with_client(base_url, http)
    }

    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, DataUnavailable> {
        let base_url = Url::parse(base_url)
            .map_err(|e| DataUnavailable::Http(format!("invalid base url '{}': {}", base_url, e)))?;
        Ok(Self {
            base_url,
            http,
            backoff: ExponentialBuilder::default()
                .with_min_delay(Duration::from_millis(200))
                .with_max_delay(Duration::from_secs(2))
                .with_max_times(MAX_RETRIES),
        })
    }

    /// Overrides the retry policy, mainly so tests do not sleep
    pub fn with_backoff(mut self, backoff: ExponentialBuilder) -> Self {
        self.backoff = backoff;
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, DataUnavailable> {
        self.base_url
            .join(path)
            .map_err(|e| DataUnavailable::Http(format!("invalid endpoint '{}': {}", path, e)))
    }

    async fn get_json(&self, url: Url) -> Result<Value, DataUnavailable> {
        let request = || {
            let url = url.clone();
            async move {
                let response = self
                    .http
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| DataUnavailable::Http(e.to_string()))?;

                let status = response.status();
                if status == StatusCode::BAD_REQUEST || status == StatusCode::NOT_FOUND {
                    let body = response.text().await.unwrap_or_default();
                    return Err(DataUnavailable::NotFound(body));
                }
                if !status.is_success() {
                    return Err(DataUnavailable::Http(format!("status {}", status)));
                }

                response
                    .json::<Value>()
                    .await
                    .map_err(|e| DataUnavailable::Malformed(e.to_string()))
            }
        };

        request
            .retry(self.backoff.clone())
            .when(|e: &DataUnavailable| e.is_transient())
            .notify(|e: &DataUnavailable, after: Duration| {
                warn!(error = %e, retry_in_ms = after.as_millis() as u64, "Binance request failed, retrying");
            })
            .await
    }
}

/// Parses one kline row `[open_time, open, high, low, close, volume, ...]`
fn parse_kline(row: &Value) -> Result<Candle, DataUnavailable> {
    let fields = row
        .as_array()
        .filter(|f| f.len() >= 6)
        .ok_or_else(|| DataUnavailable::Malformed(format!("unexpected kline row: {}", row)))?;

    let open_time = fields[0]
        .as_i64()
        .ok_or_else(|| DataUnavailable::Malformed("kline open time is not an integer".to_string()))?;
    let timestamp: DateTime<Utc> = DateTime::from_timestamp_millis(open_time)
        .ok_or_else(|| DataUnavailable::Malformed(format!("kline open time {} out of range", open_time)))?;

    let number = |idx: usize| -> Result<f64, DataUnavailable> {
        let value = &fields[idx];
        let parsed = match value {
            Value::String(s) => s.parse::<f64>().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        };
        parsed.ok_or_else(|| DataUnavailable::Malformed(format!("kline field {} is not numeric: {}", idx, value)))
    };

    Ok(Candle::new(
        number(1)?,
        number(2)?,
        number(3)?,
        number(4)?,
        number(5)?,
        timestamp,
    ))
}

#[async_trait]
impl MarketDataSource for BinanceFuturesClient {
    async fn fetch_bars(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, DataUnavailable> {
        let mut url = self.endpoint(KLINES_PATH)?;
        url.query_pairs_mut()
            .append_pair("symbol", symbol)
            .append_pair("interval", interval)
            .append_pair("limit", &limit.to_string());

        let body = self.get_json(url).await?;
        let rows = body
            .as_array()
            .ok_or_else(|| DataUnavailable::Malformed("klines response is not an array".to_string()))?;
        let candles = rows.iter().map(parse_kline).collect::<Result<Vec<_>, _>>()?;

        debug!(
            symbol = %symbol,
            interval = %interval,
            count = candles.len(),
            "Fetched {} {} bars for {}",
            candles.len(),
            interval,
            symbol
        );
        Ok(candles)
    }

    async fn list_instruments(
        &self,
        filter: &InstrumentFilter,
    ) -> Result<Vec<String>, DataUnavailable> {
        let body = self.get_json(self.endpoint(EXCHANGE_INFO_PATH)?).await?;
        let info: ExchangeInfo =
            serde_json::from_value(body).map_err(|e| DataUnavailable::Malformed(e.to_string()))?;

        let symbols = info
            .symbols
            .into_iter()
            .filter(|s| s.matches(filter))
            .map(|s| s.symbol)
            .take(filter.limit.unwrap_or(usize::MAX))
            .collect();
        Ok(symbols)
    }
}
