//! Binance futures reference data source

pub mod client;

pub use client::BinanceFuturesClient;
