//! MACD (Moving Average Convergence Divergence) indicator

use crate::indicators::trend::ema::{ema, last_defined};
use crate::models::indicators::MacdIndicator;

/// Index-aligned MACD series
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
    pub periods: (usize, usize, usize),
}

impl Macd {
    /// Values on the last bar, if the histogram is defined there
    pub fn latest(&self) -> Option<MacdIndicator> {
        Some(MacdIndicator {
            macd: last_defined(&self.line)?,
            signal: last_defined(&self.signal)?,
            histogram: last_defined(&self.histogram)?,
            period: Some((
                self.periods.0 as u32,
                self.periods.1 as u32,
                self.periods.2 as u32,
            )),
        })
    }

    pub fn latest_histogram(&self) -> Option<f64> {
        last_defined(&self.histogram)
    }
}

/// Calculate MACD
///
/// MACD = EMA(fast) - EMA(slow) where both are defined
/// Signal = EMA(signal) over the defined MACD values, right-aligned
/// Histogram = MACD - Signal where both are defined
///
/// Too little history yields all-`None` series rather than an error.
pub fn macd(values: &[f64], fast_period: usize, slow_period: usize, signal_period: usize) -> Macd {
    let len = values.len();
    let fast = ema(values, fast_period).unwrap_or_else(|_| vec![None; len]);
    let slow = ema(values, slow_period).unwrap_or_else(|_| vec![None; len]);

    let line: Vec<Option<f64>> = fast
        .iter()
        .zip(slow.iter())
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    // Defined MACD values form a contiguous suffix, so left-padding the
    // signal EMA realigns it with the input.
    let defined: Vec<f64> = line.iter().flatten().copied().collect();
    let signal = match ema(&defined, signal_period) {
        Ok(series) => {
            let mut aligned = vec![None; len - series.len()];
            aligned.extend(series);
            aligned
        }
        Err(_) => vec![None; len],
    };

    let histogram = line
        .iter()
        .zip(signal.iter())
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m - s),
            _ => None,
        })
        .collect();

    Macd {
        line,
        signal,
        histogram,
        periods: (fast_period, slow_period, signal_period),
    }
}

/// Calculate MACD with default periods (12, 26, 9)
pub fn macd_default(values: &[f64]) -> Macd {
    macd(values, 12, 26, 9)
}
