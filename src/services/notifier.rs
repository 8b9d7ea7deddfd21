//! Signal notification sinks.
//!
//! Delivery is best-effort: `publish_signals` logs failures and keeps going.

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::signal::Signal;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook rejected message with status {0}")]
    Rejected(u16),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(&self, message: &str) -> Result<(), NotifyError>;
}

/// Posts `{"content": message}` to a chat webhook
pub struct DiscordWebhookNotifier {
    webhook_url: String,
    http: reqwest::Client,
}

impl DiscordWebhookNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self::with_client(webhook_url, reqwest::Client::new())
    }

    pub fn with_client(webhook_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            http,
        }
    }
}

#[async_trait]
impl Notifier for DiscordWebhookNotifier {
    async fn publish(&self, message: &str) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(&self.webhook_url)
            .json(&json!({ "content": message }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

/// Writes messages to the log instead of a chat service
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, message: &str) -> Result<(), NotifyError> {
        info!(target: "perpscan::notify", "{}", message);
        Ok(())
    }
}

/// Fixed decimals by magnitude so sub-cent prices stay readable
pub fn format_price(price: f64) -> String {
    let decimals = match price.abs() {
        p if p >= 100.0 => 2,
        p if p >= 1.0 => 4,
        _ => 6,
    };
    format!("{:.*}", decimals, price)
}

pub fn format_signal(signal: &Signal) -> String {
    format!(
        "📈 {} [{}] | {}\n\
         Entry: {} | TP: {} | SL: {}\n\
         Confidence: {:.0}% | Score: {:.2}\n\
         Regime: {} | Trend: {}\n\
         Timestamp: {}",
        signal.symbol,
        signal.side.as_str().to_uppercase(),
        signal.strategy,
        format_price(signal.entry),
        format_price(signal.target),
        format_price(signal.stop),
        signal.confidence,
        signal.score,
        signal.regime,
        signal.trend,
        signal.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

/// Publishes each signal in order; returns how many were delivered
pub async fn publish_signals(notifier: &dyn Notifier, signals: &[Signal]) -> usize {
    let mut delivered = 0;
    for signal in signals {
        match notifier.publish(&format_signal(signal)).await {
            Ok(()) => delivered += 1,
            Err(e) => {
                warn!(
                    symbol = %signal.symbol,
                    error = %e,
                    "Notification for {} failed: {}",
                    signal.symbol,
                    e
                );
            }
        }
    }
    delivered
}
