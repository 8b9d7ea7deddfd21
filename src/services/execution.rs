//! Order placement interface

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::info;

use crate::models::signal::Signal;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("order rejected: {0}")]
    Rejected(String),

    #[error("execution venue unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ExecutionGateway: Send + Sync {
    /// Places an order for `signal`, returning the venue's order id
    async fn place_order(&self, signal: &Signal) -> Result<String, ExecutionError>;
}

/// Logs orders and hands back sequential synthetic ids
#[derive(Default)]
pub struct DryRunGateway {
    next_id: AtomicU64,
}

impl DryRunGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orders_placed(&self) -> u64 {
        self.next_id.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutionGateway for DryRunGateway {
    async fn place_order(&self, signal: &Signal) -> Result<String, ExecutionError> {
        if !signal.is_well_formed() {
            return Err(ExecutionError::Rejected(format!(
                "{} {} has an invalid price ladder",
                signal.symbol, signal.side
            )));
        }

        let seq = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let order_id = format!("dry-{}-{}", signal.symbol, seq);
        info!(
            symbol = %signal.symbol,
            side = %signal.side,
            size = signal.position_size,
            entry = signal.entry,
            order_id = %order_id,
            "Dry-run order {} {} {} @ {}",
            signal.side,
            signal.position_size,
            signal.symbol,
            signal.entry
        );
        Ok(order_id)
    }
}
