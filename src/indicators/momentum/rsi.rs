//! RSI (Relative Strength Index) indicator

use crate::common::math;

/// Returned when there is not enough history to measure momentum
pub const RSI_NEUTRAL: f64 = 50.0;

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Calculate RSI from the last `period` close-to-close deltas.
///
/// RSI = 100 - (100 / (1 + RS)), RS = average gain / average loss, using
/// simple averages over the window (no Wilder smoothing). Rounded to two
/// decimals. Returns 50 with fewer than `period` deltas and 100 when the
/// window holds no losses.
pub fn rsi(values: &[f64], period: usize) -> f64 {
    if period == 0 || values.len() < period + 1 {
        return RSI_NEUTRAL;
    }

    let window = &values[values.len() - period - 1..];
    let (gains, losses) = window
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold((0.0, 0.0), |(gains, losses), delta| {
            if delta > 0.0 {
                (gains + delta, losses)
            } else {
                (gains, losses - delta)
            }
        });

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    math::round_to(100.0 - (100.0 / (1.0 + rs)), 2)
}

/// Calculate RSI with default period (14)
pub fn rsi_default(values: &[f64]) -> f64 {
    rsi(values, DEFAULT_RSI_PERIOD)
}
