//! Thin adapters over the `ta` indicator library.
//!
//! Each function returns `None` when the series is shorter than the
//! indicator's lookback window, so a thin history degrades to "N/A"
//! readings instead of reporting warm-up garbage.

use analysis_core::Bar;
use ta::indicators::{
    AverageTrueRange, BollingerBands, ExponentialMovingAverage, FastStochastic,
    MovingAverageConvergenceDivergence, RelativeStrengthIndex, SimpleMovingAverage,
};
use ta::{DataItem, Next};

pub struct MacdOutput {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

pub struct BollingerOutput {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;

pub fn last_sma(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() < period {
        return None;
    }
    let mut sma = SimpleMovingAverage::new(period).ok()?;
    closes.iter().map(|&c| sma.next(c)).last()
}

pub fn last_ema(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() < period {
        return None;
    }
    let mut ema = ExponentialMovingAverage::new(period).ok()?;
    closes.iter().map(|&c| ema.next(c)).last()
}

pub fn last_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() < period + 1 {
        return None;
    }
    let mut rsi = RelativeStrengthIndex::new(period).ok()?;
    closes.iter().map(|&c| rsi.next(c)).last()
}

pub fn last_macd(closes: &[f64]) -> Option<MacdOutput> {
    if closes.len() < MACD_SLOW + MACD_SIGNAL {
        return None;
    }
    let mut macd =
        MovingAverageConvergenceDivergence::new(MACD_FAST, MACD_SLOW, MACD_SIGNAL).ok()?;
    closes
        .iter()
        .map(|&c| macd.next(c))
        .last()
        .map(|out| MacdOutput {
            macd: out.macd,
            signal: out.signal,
            histogram: out.histogram,
        })
}

pub fn last_bollinger(closes: &[f64], period: usize, std_dev: f64) -> Option<BollingerOutput> {
    if closes.len() < period {
        return None;
    }
    let mut bb = BollingerBands::new(period, std_dev).ok()?;
    closes
        .iter()
        .map(|&c| bb.next(c))
        .last()
        .map(|out| BollingerOutput {
            upper: out.upper,
            middle: out.average,
            lower: out.lower,
        })
}

/// Fast %K plus its `smoothing`-bar moving average as %D.
pub fn stochastic_kd(bars: &[Bar], period: usize, smoothing: usize) -> (Option<f64>, Option<f64>) {
    if bars.len() < period {
        return (None, None);
    }
    let items = data_items(bars);
    if items.len() < period {
        return (None, None);
    }

    let mut stoch = match FastStochastic::new(period) {
        Ok(s) => s,
        Err(_) => return (None, None),
    };
    let k_series: Vec<f64> = items.iter().map(|item| stoch.next(item)).collect();
    let k = k_series.last().copied();
    let d = last_sma(&k_series, smoothing);
    (k, d)
}

pub fn last_atr(bars: &[Bar], period: usize) -> Option<f64> {
    if bars.len() < period + 1 {
        return None;
    }
    let items = data_items(bars);
    if items.len() < period + 1 {
        return None;
    }
    let mut atr = AverageTrueRange::new(period).ok()?;
    items.iter().map(|item| atr.next(item)).last()
}

/// Convert bars to `ta` data items, dropping rows the library rejects
/// (e.g. feed glitches where low > high).
fn data_items(bars: &[Bar]) -> Vec<DataItem> {
    bars.iter()
        .filter_map(|bar| {
            DataItem::builder()
                .open(bar.open)
                .high(bar.high)
                .low(bar.low)
                .close(bar.close)
                .volume(bar.volume)
                .build()
                .ok()
        })
        .collect()
}

#[cfg(test)]
#[path = "indicators_tests.rs"]
mod indicators_tests;
