//! Bollinger Bands indicator

use crate::common::math;
use crate::indicators::trend::ema::sma;
use crate::models::indicators::BollingerBand;

/// Calculate Bollinger Bands
///
/// Middle Band = SMA(period)
/// Upper Band = Middle + (std_dev * population standard deviation)
/// Lower Band = Middle - (std_dev * population standard deviation)
///
/// Index-aligned with the input; entries before `period - 1` are `None`.
pub fn bollinger(values: &[f64], period: usize, std_dev: f64) -> Vec<Option<BollingerBand>> {
    sma(values, period)
        .into_iter()
        .enumerate()
        .map(|(i, middle)| {
            let middle = middle?;
            let window = &values[i + 1 - period..=i];
            let deviation = math::population_std_dev(window, middle);
            Some(BollingerBand {
                upper: middle + std_dev * deviation,
                middle,
                lower: middle - std_dev * deviation,
            })
        })
        .collect()
}

/// Calculate Bollinger Bands with default parameters (20 SMA, 2σ)
pub fn bollinger_default(values: &[f64]) -> Vec<Option<BollingerBand>> {
    bollinger(values, 20, 2.0)
}
