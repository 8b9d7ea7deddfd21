//! Unit tests for Bollinger Bands

use perpscan::indicators::volatility::{bollinger, bollinger_default};

#[test]
fn test_bollinger_constant_series_collapses() {
    let bands = bollinger(&[10.0; 5], 3, 2.0);
    assert!(bands[1].is_none());
    let band = bands[4].unwrap();
    assert_eq!(band.upper, 10.0);
    assert_eq!(band.middle, 10.0);
    assert_eq!(band.lower, 10.0);
}

#[test]
fn test_bollinger_uses_population_std_dev() {
    // window [2, 4, 4, 4, 5, 5, 7, 9]: mean 5, population sd 2
    let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
    let band = bollinger(&values, 8, 2.0)[7].unwrap();
    assert_eq!(band.middle, 5.0);
    assert_eq!(band.upper, 9.0);
    assert_eq!(band.lower, 1.0);
}

#[test]
fn test_bollinger_warmup_is_undefined() {
    let values: Vec<f64> = (0..25).map(|i| i as f64).collect();
    let bands = bollinger_default(&values);
    assert_eq!(bands.len(), 25);
    assert_eq!(bands.iter().filter(|b| b.is_none()).count(), 19);
}

#[test]
fn test_breakout_detection() {
    let band = bollinger(&[1.0, 2.0, 3.0], 3, 1.0)[2].unwrap();
    assert!(band.is_breakout(band.upper + 0.01));
    assert!(band.is_breakout(band.lower - 0.01));
    assert!(!band.is_breakout(band.middle));
}
