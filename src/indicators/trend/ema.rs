//! EMA / SMA (exponential and simple moving averages)

use crate::common::math;
use crate::indicators::error::IndicatorError;

/// Exponential moving average over the whole series.
///
/// Seeded with the arithmetic mean of the first `period` values, then
/// `price * k + previous * (1 - k)` with `k = 2 / (period + 1)`. The output
/// is index-aligned with the input; the first `period - 1` entries are `None`.
pub fn ema(values: &[f64], period: usize) -> Result<Vec<Option<f64>>, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod(period));
    }
    if values.len() < period {
        return Err(IndicatorError::InsufficientData {
            required: period,
            actual: values.len(),
        });
    }

    let mut output = Vec::with_capacity(values.len());
    output.extend(std::iter::repeat(None).take(period - 1));

    let mut previous = values[..period].iter().sum::<f64>() / period as f64;
    output.push(Some(previous));

    for &price in &values[period..] {
        previous = math::ema_from_previous(price, previous, period);
        output.push(Some(previous));
    }

    Ok(output)
}

/// Simple rolling mean. A series shorter than `period` yields all `None`.
pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 || values.len() < period {
        return vec![None; values.len()];
    }

    let mut output = Vec::with_capacity(values.len());
    output.extend(std::iter::repeat(None).take(period - 1));
    output.extend(
        values
            .windows(period)
            .map(|window| Some(window.iter().sum::<f64>() / period as f64)),
    );
    output
}

/// Latest defined value of an aligned indicator series
pub fn last_defined(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten()
}

/// Direction of the fast EMA relative to the slow one on the last bar:
/// `Some(1)` above, `Some(-1)` below, `Some(0)` equal.
pub fn check_ema_cross(values: &[f64], fast_period: usize, slow_period: usize) -> Option<i32> {
    let fast = last_defined(&ema(values, fast_period).ok()?)?;
    let slow = last_defined(&ema(values, slow_period).ok()?)?;

    if fast > slow {
        Some(1)
    } else if fast < slow {
        Some(-1)
    } else {
        Some(0)
    }
}
