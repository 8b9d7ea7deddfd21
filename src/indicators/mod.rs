//! Pure indicator functions over close/volume series.
//!
//! Every windowed indicator returns a series index-aligned with its input,
//! with `None` for the warm-up entries.

pub mod error;

pub mod momentum;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use error::IndicatorError;
pub use momentum::{macd, rsi, Macd, RSI_NEUTRAL};
pub use trend::{ema, last_defined, sma};
pub use volatility::bollinger;
pub use volume::{volume_average, volume_spike};
