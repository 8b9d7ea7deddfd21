//! Multi-timeframe trend votes and the counter-trend gate

use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{IndicatorParams, ScanConfig};
use crate::indicators::{ema, last_defined, sma};
use crate::models::signal::{Side, Trend};
use crate::services::market_data::{DataUnavailable, MarketDataSource};

/// Timeframe label to vote, ordered for deterministic iteration
pub type TrendVotes = BTreeMap<String, Trend>;

/// Vote for one timeframe from its closes.
///
/// Bullish when `close > sma_long` and `ema_fast > ema_slow`, bearish when
/// both are reversed, neutral otherwise or with fewer than `min_bars` closes.
pub fn classify_closes(closes: &[f64], params: &IndicatorParams, min_bars: usize) -> Trend {
    if closes.len() < min_bars {
        return Trend::Neutral;
    }
    let Some(&close) = closes.last() else {
        return Trend::Neutral;
    };

    let fast = ema(closes, params.ema_fast).ok().and_then(|s| last_defined(&s));
    let slow = ema(closes, params.ema_slow).ok().and_then(|s| last_defined(&s));
    let long = last_defined(&sma(closes, params.sma_long));

    match (fast, slow, long) {
        (Some(fast), Some(slow), Some(long)) => {
            if close > long && fast > slow {
                Trend::Bullish
            } else if close < long && fast < slow {
                Trend::Bearish
            } else {
                Trend::Neutral
            }
        }
        _ => Trend::Neutral,
    }
}

/// Vote counts relative to one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Confluence {
    pub agreeing: usize,
    pub opposing: usize,
    pub total: usize,
}

impl Confluence {
    pub fn for_side(side: Side, votes: &TrendVotes) -> Self {
        let aligned = side.aligned_trend();
        let mut confluence = Confluence {
            total: votes.len(),
            ..Default::default()
        };
        for vote in votes.values() {
            if *vote == aligned {
                confluence.agreeing += 1;
            } else if *vote != Trend::Neutral {
                confluence.opposing += 1;
            }
        }
        confluence
    }

    /// Every timeframe agrees with the side
    pub fn is_full(&self) -> bool {
        self.total > 0 && self.agreeing == self.total
    }

    /// More than half of the timeframes agree
    pub fn is_majority(&self) -> bool {
        self.agreeing * 2 > self.total
    }

    pub fn net(&self) -> i64 {
        self.agreeing as i64 - self.opposing as i64
    }
}

/// Vetoes a short when bullish votes outnumber bearish ones, and a long in
/// the opposite case. Ties allow either side.
pub fn is_trade_allowed(side: Side, votes: &TrendVotes) -> bool {
    let bullish = votes.values().filter(|v| **v == Trend::Bullish).count();
    let bearish = votes.values().filter(|v| **v == Trend::Bearish).count();
    match side {
        Side::Long => bearish <= bullish,
        Side::Short => bullish <= bearish,
    }
}

/// Fetches each configured timeframe and votes on it
pub struct TrendClassifier {
    source: Arc<dyn MarketDataSource>,
    timeframes: Vec<String>,
    bar_limit: usize,
    min_bars: usize,
    fetch_timeout: Duration,
    params: IndicatorParams,
}

impl TrendClassifier {
    pub fn new(source: Arc<dyn MarketDataSource>, config: &ScanConfig) -> Self {
        Self {
            source,
            timeframes: config.trend_timeframes.clone(),
            bar_limit: config.trend_bar_limit,
            min_bars: config.trend_min_bars,
            fetch_timeout: config.fetch_timeout,
            params: config.indicators.clone(),
        }
    }

    /// Votes for every timeframe. A failed or timed-out fetch votes neutral.
    pub async fn votes(&self, symbol: &str) -> TrendVotes {
        let fetches = self.timeframes.iter().map(|timeframe| async move {
            let vote = match self.fetch_closes(symbol, timeframe).await {
                Ok(closes) => classify_closes(&closes, &self.params, self.min_bars),
                Err(e) => {
                    warn!(
                        symbol = %symbol,
                        timeframe = %timeframe,
                        error = %e,
                        "Trend fetch failed for {} {}, voting neutral",
                        symbol,
                        timeframe
                    );
                    Trend::Neutral
                }
            };
            (timeframe.clone(), vote)
        });

        let votes: TrendVotes = join_all(fetches).await.into_iter().collect();
        debug!(symbol = %symbol, votes = ?votes, "Trend votes for {}", symbol);
        votes
    }

    async fn fetch_closes(&self, symbol: &str, timeframe: &str) -> Result<Vec<f64>, DataUnavailable> {
        let bars = tokio::time::timeout(
            self.fetch_timeout,
            self.source.fetch_bars(symbol, timeframe, self.bar_limit),
        )
        .await
        .map_err(|_| DataUnavailable::Timeout(self.fetch_timeout.as_millis() as u64))??;
        Ok(bars.into_iter().map(|c| c.close).collect())
    }
}
