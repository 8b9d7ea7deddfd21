//! perpscan: technical-indicator and signal engine for perpetual futures.
//!
//! Bars come in through a [`services::MarketDataSource`], are analysed per
//! symbol by [`signals::SignalEngine`], and the [`core::Scanner`] ranks the
//! resulting signals into a [`models::ScanResult`].

pub mod bookkeeping;
pub mod common;
pub mod config;
pub mod core;
pub mod error;
pub mod indicators;
pub mod jobs;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;

pub use error::{ErrorKind, ScanError};
