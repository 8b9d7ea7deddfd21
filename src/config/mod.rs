//! Scan configuration and environment helpers.
//!
//! Every tunable of the engine lives in [`ScanConfig`]. Defaults match the
//! reference deployment; `from_env` applies `SCAN_*` overrides on top.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ScanError;
use crate::services::market_data::InstrumentFilter;

pub const DEFAULT_BINANCE_URL: &str = "https://fapi.binance.com";
pub const DEFAULT_SCAN_EVERY_SECONDS: u64 = 3600;

/// Deployment environment, `sandbox` unless `APP_ENV` says otherwise
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

pub fn get_binance_url() -> String {
    env::var("BINANCE_FUTURES_URL").unwrap_or_else(|_| DEFAULT_BINANCE_URL.to_string())
}

/// Webhook for signal notifications; `None` disables the chat sink
pub fn get_discord_webhook_url() -> Option<String> {
    env::var("DISCORD_WEBHOOK_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
}

pub fn get_report_dir() -> PathBuf {
    env::var("REPORT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("reports"))
}

pub fn get_state_dir() -> PathBuf {
    env::var("STATE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("state"))
}

/// Seconds between worker scan cycles (`SCAN_EVERY_SECONDS`, default one hour)
pub fn get_scan_every_seconds() -> Result<u64, ScanError> {
    Ok(parse_env("SCAN_EVERY_SECONDS")?.unwrap_or(DEFAULT_SCAN_EVERY_SECONDS))
}

fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

pub fn paper_trading_enabled() -> bool {
    env_flag("PAPER_TRADING")
}

pub fn execute_trades_enabled() -> bool {
    env_flag("EXECUTE_TRADES")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub sma_short: usize,
    pub sma_long: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_std_dev: f64,
    pub volume_window: usize,
    pub volume_spike_multiplier: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_fast: 9,
            ema_slow: 21,
            sma_short: 20,
            sma_long: 50,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            volume_window: 20,
            volume_spike_multiplier: 1.5,
        }
    }
}

impl IndicatorParams {
    /// Minimum bars needed for every last-bar indicator value to be defined
    pub fn warmup(&self) -> usize {
        [
            self.ema_fast,
            self.ema_slow,
            self.sma_short,
            self.sma_long,
            self.rsi_period + 1,
            self.bollinger_period,
            self.volume_window,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    fn periods(&self) -> [(&'static str, usize); 10] {
        [
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("sma_short", self.sma_short),
            ("sma_long", self.sma_long),
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bollinger_period", self.bollinger_period),
            ("volume_window", self.volume_window),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeParams {
    /// `|sma_short - sma_long| / sma_long` above this is a trend regime
    pub divergence_threshold: f64,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
}

impl Default for RegimeParams {
    fn default() -> Self {
        Self {
            divergence_threshold: 0.01,
            rsi_oversold: 35.0,
            rsi_overbought: 65.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TargetPolicy {
    /// Target at `m` times the risk distance from entry
    RiskReward(f64),
    /// Target at a fixed fraction away from entry
    FixedPercent(f64),
}

impl Default for TargetPolicy {
    fn default() -> Self {
        TargetPolicy::RiskReward(2.0)
    }
}

impl FromStr for TargetPolicy {
    type Err = ScanError;

    /// Parses `rr:<multiple>` or `pct:<fraction>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = s
            .split_once(':')
            .ok_or_else(|| ScanError::config(format!("invalid target policy '{}'", s)))?;
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| ScanError::config(format!("invalid target policy value '{}'", value)))?;
        match kind.trim().to_ascii_lowercase().as_str() {
            "rr" => Ok(TargetPolicy::RiskReward(value)),
            "pct" => Ok(TargetPolicy::FixedPercent(value)),
            other => Err(ScanError::config(format!("unknown target policy '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskParams {
    pub leverage: f64,
    /// Capital risked per trade, in quote currency
    pub risk_budget: f64,
    pub stop_pct: f64,
    pub target: TargetPolicy,
    /// Multiplicative distance kept between the stop and liquidation
    pub safety_margin: f64,
    pub size_precision: u32,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            leverage: 20.0,
            risk_budget: 1.0,
            stop_pct: 0.10,
            target: TargetPolicy::default(),
            safety_margin: 0.01,
            size_precision: 6,
        }
    }
}

impl RiskParams {
    fn validate(&self) -> Result<(), ScanError> {
        if !(self.leverage > 1.0) {
            return Err(ScanError::config(format!(
                "leverage must be > 1, got {}",
                self.leverage
            )));
        }
        if !(self.risk_budget > 0.0) {
            return Err(ScanError::config("risk_budget must be > 0"));
        }
        if !(self.stop_pct > 0.0 && self.stop_pct < 1.0) {
            return Err(ScanError::config("stop_pct must be in (0, 1)"));
        }
        match self.target {
            TargetPolicy::RiskReward(m) if !(m > 0.0) => {
                return Err(ScanError::config("risk-reward multiple must be > 0"));
            }
            TargetPolicy::FixedPercent(p) if !(p > 0.0 && p < 1.0) => {
                return Err(ScanError::config("target percent must be in (0, 1)"));
            }
            _ => {}
        }
        if !(self.safety_margin >= 0.0) {
            return Err(ScanError::config("safety_margin must be >= 0"));
        }

        // The clamped stop must stay on the losing side of entry for both sides
        let inv = 1.0 / self.leverage;
        let long_floor = (1.0 - inv) * (1.0 + self.safety_margin);
        let short_ceiling = (1.0 + inv) * (1.0 - self.safety_margin);
        if long_floor >= 1.0 || short_ceiling <= 1.0 {
            return Err(ScanError::config(format!(
                "safety_margin {} pushes the stop through entry at leverage {}",
                self.safety_margin, self.leverage
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceParams {
    pub trend: f64,
    pub mean_reversion: f64,
    pub scalp: f64,
    pub reversal: f64,
    /// Added per agreeing vote, subtracted per opposing vote
    pub confluence_adjustment: f64,
}

impl Default for ConfidenceParams {
    fn default() -> Self {
        Self {
            trend: 90.0,
            mean_reversion: 85.0,
            scalp: 80.0,
            reversal: 75.0,
            confluence_adjustment: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub full_confluence: f64,
    pub partial_confluence: f64,
    pub rsi_band: f64,
    pub macd_alignment: f64,
    pub bollinger_breakout: f64,
    pub volume_spike: f64,
    pub confidence_factor: f64,
    pub rr_high: f64,
    pub rr_mid: f64,
    pub rr_high_threshold: f64,
    pub rr_mid_threshold: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            full_confluence: 10.0,
            partial_confluence: 5.0,
            rsi_band: 10.0,
            macd_alignment: 10.0,
            bollinger_breakout: 5.0,
            volume_spike: 10.0,
            confidence_factor: 0.3,
            rr_high: 10.0,
            rr_mid: 5.0,
            rr_high_threshold: 2.0,
            rr_mid_threshold: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityFilter {
    pub min_score: f64,
    pub min_risk_reward: f64,
    pub min_confidence: f64,
}

impl Default for QualityFilter {
    fn default() -> Self {
        Self {
            min_score: 50.0,
            min_risk_reward: 1.5,
            min_confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    pub interval: String,
    pub bar_limit: usize,
    pub warmup_bars: usize,
    pub trend_timeframes: Vec<String>,
    pub trend_bar_limit: usize,
    pub trend_min_bars: usize,
    pub workers: usize,
    #[serde(with = "duration_millis")]
    pub fetch_timeout: Duration,
    pub top_n: usize,
    pub universe: InstrumentFilter,
    pub indicators: IndicatorParams,
    pub regime: RegimeParams,
    pub risk: RiskParams,
    pub confidence: ConfidenceParams,
    pub weights: ScoreWeights,
    pub quality: QualityFilter,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval: "1h".to_string(),
            bar_limit: 100,
            warmup_bars: 60,
            trend_timeframes: vec!["15m".to_string(), "1h".to_string(), "4h".to_string()],
            trend_bar_limit: 60,
            trend_min_bars: 50,
            workers: 20,
            fetch_timeout: Duration::from_secs(5),
            top_n: 5,
            universe: InstrumentFilter::default(),
            indicators: IndicatorParams::default(),
            regime: RegimeParams::default(),
            risk: RiskParams::default(),
            confidence: ConfidenceParams::default(),
            weights: ScoreWeights::default(),
            quality: QualityFilter::default(),
        }
    }
}

impl ScanConfig {
    /// Defaults overridden by `SCAN_*` environment variables
    pub fn from_env() -> Result<Self, ScanError> {
        let mut config = Self::default();

        if let Ok(interval) = env::var("SCAN_INTERVAL") {
            config.interval = interval;
        }
        if let Ok(frames) = env::var("SCAN_TREND_TIMEFRAMES") {
            config.trend_timeframes = frames
                .split(',')
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect();
        }
        if let Some(v) = parse_env("SCAN_BAR_LIMIT")? {
            config.bar_limit = v;
        }
        if let Some(v) = parse_env("SCAN_WARMUP_BARS")? {
            config.warmup_bars = v;
        }
        if let Some(v) = parse_env("SCAN_WORKERS")? {
            config.workers = v;
        }
        if let Some(ms) = parse_env::<u64>("SCAN_FETCH_TIMEOUT_MS")? {
            config.fetch_timeout = Duration::from_millis(ms);
        }
        if let Some(v) = parse_env("SCAN_TOP_N")? {
            config.top_n = v;
        }
        if let Some(v) = parse_env("SCAN_UNIVERSE_LIMIT")? {
            config.universe.limit = Some(v);
        }
        if let Ok(quote) = env::var("SCAN_QUOTE_ASSET") {
            config.universe.quote_asset = quote;
        }
        if let Some(v) = parse_env("SCAN_LEVERAGE")? {
            config.risk.leverage = v;
        }
        if let Some(v) = parse_env("SCAN_RISK_BUDGET")? {
            config.risk.risk_budget = v;
        }
        if let Some(v) = parse_env("SCAN_STOP_PCT")? {
            config.risk.stop_pct = v;
        }
        if let Some(v) = parse_env("SCAN_SAFETY_MARGIN")? {
            config.risk.safety_margin = v;
        }
        if let Ok(policy) = env::var("SCAN_TARGET_POLICY") {
            config.risk.target = policy.parse()?;
        }
        if let Some(v) = parse_env("SCAN_MIN_SCORE")? {
            config.quality.min_score = v;
        }
        if let Some(v) = parse_env("SCAN_MIN_RR")? {
            config.quality.min_risk_reward = v;
        }
        if let Some(v) = parse_env("SCAN_MIN_CONFIDENCE")? {
            config.quality.min_confidence = v;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.workers == 0 {
            return Err(ScanError::config("workers must be > 0"));
        }
        if self.top_n == 0 {
            return Err(ScanError::config("top_n must be > 0"));
        }
        if self.fetch_timeout.is_zero() {
            return Err(ScanError::config("fetch_timeout must be > 0"));
        }
        if self.interval.trim().is_empty() {
            return Err(ScanError::config("interval must not be empty"));
        }
        for (name, period) in self.indicators.periods() {
            if period == 0 {
                return Err(ScanError::config(format!("{} must be > 0", name)));
            }
        }
        if !(self.indicators.bollinger_std_dev > 0.0) {
            return Err(ScanError::config("bollinger_std_dev must be > 0"));
        }
        if !(self.indicators.volume_spike_multiplier > 0.0) {
            return Err(ScanError::config("volume_spike_multiplier must be > 0"));
        }
        if self.warmup_bars < self.indicators.warmup() {
            return Err(ScanError::config(format!(
                "warmup_bars {} is below the indicator warm-up {}",
                self.warmup_bars,
                self.indicators.warmup()
            )));
        }
        if self.bar_limit < self.warmup_bars {
            return Err(ScanError::config(format!(
                "bar_limit {} is below warmup_bars {}",
                self.bar_limit, self.warmup_bars
            )));
        }
        if !(self.regime.divergence_threshold > 0.0) {
            return Err(ScanError::config("divergence_threshold must be > 0"));
        }
        if !(self.regime.rsi_oversold < self.regime.rsi_overbought) {
            return Err(ScanError::config("rsi_oversold must be below rsi_overbought"));
        }
        self.risk.validate()
    }
}

fn parse_env<T: FromStr>(key: &str) -> Result<Option<T>, ScanError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ScanError::config(format!("{} has invalid value '{}'", key, raw))),
        Err(_) => Ok(None),
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
