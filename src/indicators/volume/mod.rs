//! Volume indicators

use crate::common::math;

pub const DEFAULT_VOLUME_WINDOW: usize = 20;
pub const DEFAULT_SPIKE_MULTIPLIER: f64 = 1.5;

/// Average volume over the trailing `window` bars (last bar included)
pub fn volume_average(volumes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || volumes.len() < window {
        return None;
    }
    math::mean(&volumes[volumes.len() - window..])
}

/// True when the last bar's volume exceeds `multiplier` times the trailing
/// average. False without enough history or with a zero average.
pub fn volume_spike(volumes: &[f64], window: usize, multiplier: f64) -> bool {
    match (volume_average(volumes, window), volumes.last()) {
        (Some(average), Some(&last)) if average > 0.0 => last > average * multiplier,
        _ => false,
    }
}
