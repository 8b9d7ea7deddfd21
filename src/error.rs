//! Crate-level error taxonomy

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::indicators::IndicatorError;
use crate::services::market_data::DataUnavailable;

/// Closed set of failure classes recorded per symbol in a scan result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InsufficientData,
    ComputationDegenerate,
    ExternalService,
    Configuration,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InsufficientData => "insufficient_data",
            ErrorKind::ComputationDegenerate => "computation_degenerate",
            ErrorKind::ExternalService => "external_service",
            ErrorKind::Configuration => "configuration",
        }
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("insufficient data: need {required} values, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("degenerate computation: {0}")]
    ComputationDegenerate(String),

    #[error("external service error: {0}")]
    ExternalService(#[from] DataUnavailable),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ScanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScanError::InsufficientData { .. } => ErrorKind::InsufficientData,
            ScanError::ComputationDegenerate(_) => ErrorKind::ComputationDegenerate,
            ScanError::ExternalService(_) => ErrorKind::ExternalService,
            ScanError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        ScanError::Configuration(message.into())
    }
}

impl From<IndicatorError> for ScanError {
    fn from(err: IndicatorError) -> Self {
        match err {
            IndicatorError::InsufficientData { required, actual } => {
                ScanError::InsufficientData { required, actual }
            }
            IndicatorError::InvalidPeriod(period) => {
                ScanError::Configuration(format!("invalid indicator period: {}", period))
            }
        }
    }
}
