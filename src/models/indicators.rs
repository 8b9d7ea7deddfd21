use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::IndicatorParams;
use crate::indicators::{self, IndicatorError, Macd};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub timestamp: DateTime<Utc>,
}

impl Candle {
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume,
            timestamp,
        }
    }
}

/// Ordered bars for one symbol and interval. Immutable once built.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    symbol: String,
    interval: String,
    candles: Vec<Candle>,
}

impl PriceSeries {
    /// Builds a series, ordering bars by timestamp (stable for equal stamps)
    pub fn new(symbol: impl Into<String>, interval: impl Into<String>, mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.timestamp);
        Self {
            symbol: symbol.into(),
            interval: interval.into(),
            candles,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn interval(&self) -> &str {
        &self.interval
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }

    /// Fails with `InsufficientData` below the warm-up length
    pub fn require(&self, min_len: usize) -> Result<(), IndicatorError> {
        if self.candles.len() < min_len {
            return Err(IndicatorError::InsufficientData {
                required: min_len,
                actual: self.candles.len(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdIndicator {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<(u32, u32, u32)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBand {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerBand {
    pub fn is_breakout(&self, price: f64) -> bool {
        price > self.upper || price < self.lower
    }
}

/// Indicator arrays aligned with a `PriceSeries`
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    pub ema_fast: Vec<Option<f64>>,
    pub ema_slow: Vec<Option<f64>>,
    pub sma_short: Vec<Option<f64>>,
    pub sma_long: Vec<Option<f64>>,
    pub macd: Macd,
    pub bollinger: Vec<Option<BollingerBand>>,
    pub rsi: f64,
    pub volume_spike: bool,
    pub close: f64,
}

/// Last-bar view of an `IndicatorSet` with the windowed values resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub sma_short: f64,
    pub sma_long: f64,
    pub rsi: f64,
    pub macd_histogram: Option<f64>,
    pub bollinger: BollingerBand,
    pub volume_spike: bool,
}

impl IndicatorSet {
    pub fn compute(series: &PriceSeries, params: &IndicatorParams) -> Result<Self, IndicatorError> {
        series.require(params.warmup())?;

        let closes = series.closes();
        let volumes = series.volumes();
        let close = series.last_close().ok_or(IndicatorError::InsufficientData {
            required: params.warmup(),
            actual: 0,
        })?;

        Ok(Self {
            ema_fast: indicators::ema(&closes, params.ema_fast)?,
            ema_slow: indicators::ema(&closes, params.ema_slow)?,
            sma_short: indicators::sma(&closes, params.sma_short),
            sma_long: indicators::sma(&closes, params.sma_long),
            macd: indicators::macd(&closes, params.macd_fast, params.macd_slow, params.macd_signal),
            bollinger: indicators::bollinger(&closes, params.bollinger_period, params.bollinger_std_dev),
            rsi: indicators::rsi(&closes, params.rsi_period),
            volume_spike: indicators::volume_spike(
                &volumes,
                params.volume_window,
                params.volume_spike_multiplier,
            ),
            close,
        })
    }

    /// Resolves last-bar values; an undefined required value means the
    /// series needed at least one more bar
    pub fn snapshot(&self) -> Result<IndicatorSnapshot, IndicatorError> {
        let len = self.ema_fast.len();
        let undefined = || IndicatorError::InsufficientData {
            required: len + 1,
            actual: len,
        };

        Ok(IndicatorSnapshot {
            close: self.close,
            ema_fast: indicators::last_defined(&self.ema_fast).ok_or_else(undefined)?,
            ema_slow: indicators::last_defined(&self.ema_slow).ok_or_else(undefined)?,
            sma_short: indicators::last_defined(&self.sma_short).ok_or_else(undefined)?,
            sma_long: indicators::last_defined(&self.sma_long).ok_or_else(undefined)?,
            rsi: self.rsi,
            macd_histogram: self.macd.latest_histogram(),
            bollinger: self.bollinger.last().copied().flatten().ok_or_else(undefined)?,
            volume_spike: self.volume_spike,
        })
    }
}
