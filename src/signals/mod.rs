//! Trend votes, regime classification and signal synthesis.

pub mod builder;
pub mod engine;
pub mod regime;
pub mod scoring;
pub mod trend;

pub use builder::{Rejection, SignalBuilder, SignalRequest};
pub use engine::{Analysis, Candidate, SignalEngine};
pub use regime::{RegimeClassifier, RegimeReading};
pub use scoring::composite_score;
pub use trend::{is_trade_allowed, Confluence, TrendClassifier, TrendVotes};
