use super::*;
use chrono::{Duration, TimeZone, Utc};

fn sample_prices() -> Vec<f64> {
    vec![
        44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
        45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64, 46.21, 46.25, 45.71, 46.45,
        45.78, 45.35, 44.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13, 43.55, 44.01, 44.22,
        44.88, 45.10, 45.32, 45.61,
    ]
}

fn sample_bars(count: usize) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let close = 100.0 + i as f64;
            Bar {
                timestamp: start + Duration::days(i as i64),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000_000.0,
            }
        })
        .collect()
}

#[test]
fn sma_requires_full_window() {
    let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
    let value = last_sma(&data, 3).unwrap();
    assert!((value - 4.0).abs() < 1e-9); // (3+4+5)/3

    assert!(last_sma(&data, 6).is_none());
    assert!(last_sma(&[], 3).is_none());
}

#[test]
fn ema_tracks_uptrend() {
    let data: Vec<f64> = (1..=20).map(|v| v as f64).collect();
    let ema = last_ema(&data, 5).unwrap();
    let sma = last_sma(&data, 5).unwrap();
    // EMA leans toward recent values in a monotone uptrend
    assert!(ema > sma - 1.0);
    assert!(last_ema(&data[..3], 5).is_none());
}

#[test]
fn rsi_stays_in_range() {
    let prices = sample_prices();
    let rsi = last_rsi(&prices, 14).unwrap();
    assert!((0.0..=100.0).contains(&rsi));

    assert!(last_rsi(&prices[..10], 14).is_none());
}

#[test]
fn rsi_extremes_follow_direction() {
    let up: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
    let down: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
    assert!(last_rsi(&up, 14).unwrap() > 70.0);
    assert!(last_rsi(&down, 14).unwrap() < 30.0);
}

#[test]
fn macd_needs_slow_plus_signal_window() {
    let prices: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
    assert!(last_macd(&prices).is_some());
    assert!(last_macd(&prices[..30]).is_none());
}

#[test]
fn macd_histogram_is_line_minus_signal() {
    let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.5).collect();
    let out = last_macd(&prices).unwrap();
    assert!((out.histogram - (out.macd - out.signal)).abs() < 1e-9);
    // sustained uptrend keeps MACD above zero
    assert!(out.macd > 0.0);
}

#[test]
fn bollinger_bands_ordered() {
    let prices = sample_prices();
    let bands = last_bollinger(&prices, 20, 2.0).unwrap();
    assert!(bands.upper > bands.middle);
    assert!(bands.middle > bands.lower);

    assert!(last_bollinger(&prices[..10], 20, 2.0).is_none());
}

#[test]
fn stochastic_in_range() {
    let bars = sample_bars(30);
    let (k, d) = stochastic_kd(&bars, 14, 3);
    let k = k.unwrap();
    let d = d.unwrap();
    assert!((0.0..=100.0).contains(&k));
    assert!((0.0..=100.0).contains(&d));
    // monotone uptrend pins %K near the top of the range
    assert!(k > 80.0);

    assert_eq!(stochastic_kd(&bars[..5], 14, 3), (None, None));
}

#[test]
fn atr_positive_and_gated() {
    let bars = sample_bars(30);
    let atr = last_atr(&bars, 14).unwrap();
    assert!(atr > 0.0);

    assert!(last_atr(&bars[..10], 14).is_none());
}
