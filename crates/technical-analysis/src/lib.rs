//! Technical profile agent: indicator readings, trend classification,
//! pivot-point support/resistance, volume analysis and signal lists from a
//! daily price series.

use analysis_core::{
    round2, AgentEnvelope, AnalysisError, AtrReading, BandPosition, Bar, BollingerReading,
    HistoryRange, IndicatorSet, MacdReading, MacdSignal, MarketDataProvider, MovingAverages,
    Narrator, OverallTrend, PriceLevel, PricePosition, PriceVolumeSignal, RsiCondition,
    RsiReading, SignalBias, SignalSummary, StochasticCondition, StochasticReading,
    SupportResistance, TechnicalProfile, TickerAgent, TickerSymbol, TrendAnalysis,
    TrendDirection, TrendLeg, VolatilityLevel, VolumeAnalysis, VolumeTrend,
};
use async_trait::async_trait;
use std::sync::Arc;

pub mod indicators;

use indicators::{
    last_atr, last_bollinger, last_ema, last_macd, last_rsi, last_sma, stochastic_kd,
};

pub const AGENT_NAME: &str = "Technical Analyst";
const PERSONA: &str = "expert technical analyst specializing in chart patterns, indicators, \
                       and price action analysis";

#[derive(Clone)]
pub struct TechnicalAgent {
    provider: Arc<dyn MarketDataProvider>,
    narrator: Arc<dyn Narrator>,
}

impl TechnicalAgent {
    pub fn new(provider: Arc<dyn MarketDataProvider>, narrator: Arc<dyn Narrator>) -> Self {
        Self { provider, narrator }
    }

    async fn build(
        &self,
        ticker: &TickerSymbol,
    ) -> Result<AgentEnvelope<TechnicalProfile>, AnalysisError> {
        let history = self
            .provider
            .price_history(ticker, HistoryRange::OneYear)
            .await?;

        let profile = build_profile(&history)?;
        let confidence = signal_confidence(&profile.signals);

        let context = serde_json::json!({
            "current_price": profile.current_price,
            "trend": profile.trend.overall_trend,
            "rsi": profile.indicators.rsi.current,
            "macd_signal": profile.indicators.macd.signal_type,
            "above_200_sma": profile.indicators.moving_averages.price_vs_200sma,
            "bullish_signals": &profile.signals.bullish_signals,
            "bearish_signals": &profile.signals.bearish_signals,
        });
        let prompt = format!(
            "Analyze the technical setup for {} based on the following indicators and signals.\n\n\
             Evaluate:\n\
             1. What is the current trend?\n\
             2. Are there any bullish or bearish signals?\n\
             3. What are key support and resistance levels?\n\
             4. What is the overall technical outlook?\n\n\
             Provide actionable insights for a trader.",
            ticker.base()
        );
        let insight = self.narrator.narrate(PERSONA, &prompt, &context).await;

        Ok(AgentEnvelope::success(AGENT_NAME, profile, insight, confidence))
    }
}

#[async_trait]
impl TickerAgent for TechnicalAgent {
    type Profile = TechnicalProfile;

    fn agent_name(&self) -> &'static str {
        AGENT_NAME
    }

    async fn analyze(&self, ticker: &TickerSymbol) -> AgentEnvelope<TechnicalProfile> {
        match self.build(ticker).await {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(ticker = %ticker, error = %err, "Technical analysis failed");
                AgentEnvelope::failure(AGENT_NAME, err)
            }
        }
    }
}

/// Build the full technical profile from a daily series. Fails only on an
/// empty series; a short one degrades to "N/A" readings.
pub fn build_profile(bars: &[Bar]) -> Result<TechnicalProfile, AnalysisError> {
    if bars.is_empty() {
        return Err(AnalysisError::NoData(
            "No historical data available".to_string(),
        ));
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let current_price = *closes.last().expect("non-empty series");

    let indicator_set = compute_indicators(bars, &closes, current_price);
    let trend = analyze_trend(&closes, &indicator_set.moving_averages);
    let support_resistance = compute_support_resistance(bars);
    let volume = analyze_volume(bars, &closes);
    let signals = generate_signals(&indicator_set);

    Ok(TechnicalProfile {
        indicators: indicator_set,
        trend,
        support_resistance,
        volume,
        signals,
        current_price: round2(current_price),
    })
}

fn compute_indicators(bars: &[Bar], closes: &[f64], current_price: f64) -> IndicatorSet {
    let sma_20 = last_sma(closes, 20);
    let sma_50 = last_sma(closes, 50);
    let sma_200 = last_sma(closes, 200);
    let ema_12 = last_ema(closes, 12);
    let ema_26 = last_ema(closes, 26);

    let rsi = last_rsi(closes, 14);
    let macd = last_macd(closes);
    let bollinger = last_bollinger(closes, 20, 2.0);
    let (stoch_k, stoch_d) = stochastic_kd(bars, 14, 3);
    let atr = last_atr(bars, 14);

    IndicatorSet {
        moving_averages: MovingAverages {
            sma_20: sma_20.map(round2),
            sma_50: sma_50.map(round2),
            sma_200: sma_200.map(round2),
            ema_12: ema_12.map(round2),
            ema_26: ema_26.map(round2),
            price_vs_20sma: price_position(current_price, sma_20),
            price_vs_50sma: price_position(current_price, sma_50),
            price_vs_200sma: price_position(current_price, sma_200),
        },
        rsi: RsiReading {
            current: rsi.map(round2),
            condition: interpret_rsi(rsi),
        },
        macd: MacdReading {
            macd_line: macd.as_ref().map(|m| round4(m.macd)),
            signal_line: macd.as_ref().map(|m| round4(m.signal)),
            histogram: macd.as_ref().map(|m| round4(m.histogram)),
            signal_type: macd
                .as_ref()
                .map(|m| interpret_macd(m.macd, m.signal, m.histogram))
                .unwrap_or(MacdSignal::Unknown),
        },
        bollinger_bands: BollingerReading {
            upper: bollinger.as_ref().map(|b| round2(b.upper)),
            middle: bollinger.as_ref().map(|b| round2(b.middle)),
            lower: bollinger.as_ref().map(|b| round2(b.lower)),
            position: bollinger
                .as_ref()
                .map(|b| band_position(current_price, b.upper, b.lower))
                .unwrap_or(BandPosition::Unknown),
        },
        stochastic: StochasticReading {
            k: stoch_k.map(round2),
            d: stoch_d.map(round2),
            condition: interpret_stochastic(stoch_k),
        },
        atr: AtrReading {
            value: atr.map(round2),
            volatility: interpret_atr(atr, current_price),
        },
    }
}

fn price_position(price: f64, average: Option<f64>) -> PricePosition {
    match average {
        Some(avg) if price > avg => PricePosition::Above,
        Some(_) => PricePosition::Below,
        None => PricePosition::Unknown,
    }
}

fn interpret_rsi(rsi: Option<f64>) -> RsiCondition {
    match rsi {
        None => RsiCondition::Unknown,
        Some(v) if v > 70.0 => RsiCondition::Overbought,
        Some(v) if v < 30.0 => RsiCondition::Oversold,
        Some(v) if v > 50.0 => RsiCondition::Bullish,
        Some(_) => RsiCondition::Bearish,
    }
}

fn interpret_macd(macd: f64, signal: f64, histogram: f64) -> MacdSignal {
    if macd > signal && histogram > 0.0 {
        MacdSignal::BullishCrossover
    } else if macd < signal && histogram < 0.0 {
        MacdSignal::BearishCrossover
    } else if macd > 0.0 {
        MacdSignal::Bullish
    } else {
        MacdSignal::Bearish
    }
}

fn interpret_stochastic(k: Option<f64>) -> StochasticCondition {
    match k {
        None => StochasticCondition::Unknown,
        Some(v) if v > 80.0 => StochasticCondition::Overbought,
        Some(v) if v < 20.0 => StochasticCondition::Oversold,
        Some(_) => StochasticCondition::Neutral,
    }
}

fn interpret_atr(atr: Option<f64>, price: f64) -> VolatilityLevel {
    let Some(atr) = atr else {
        return VolatilityLevel::Unknown;
    };
    if price <= 0.0 {
        return VolatilityLevel::Unknown;
    }
    let atr_pct = atr / price * 100.0;
    if atr_pct > 3.0 {
        VolatilityLevel::High
    } else if atr_pct > 1.5 {
        VolatilityLevel::Moderate
    } else {
        VolatilityLevel::Low
    }
}

fn band_position(price: f64, upper: f64, lower: f64) -> BandPosition {
    let range = upper - lower;
    if range <= 0.0 {
        return BandPosition::Unknown;
    }
    let position = (price - lower) / range;
    if position > 0.9 {
        BandPosition::NearUpper
    } else if position < 0.1 {
        BandPosition::NearLower
    } else {
        BandPosition::Middle
    }
}

fn trend_leg(closes: &[f64], lookback: usize) -> TrendLeg {
    if closes.len() < lookback || lookback < 2 {
        return TrendLeg {
            direction: TrendDirection::Unknown,
            change_percent: 0.0,
        };
    }
    let current = closes[closes.len() - 1];
    let past = closes[closes.len() - lookback];
    if past <= 0.0 {
        return TrendLeg {
            direction: TrendDirection::Unknown,
            change_percent: 0.0,
        };
    }
    TrendLeg {
        direction: if current > past {
            TrendDirection::Bullish
        } else {
            TrendDirection::Bearish
        },
        change_percent: round2((current - past) / past * 100.0),
    }
}

fn analyze_trend(closes: &[f64], averages: &MovingAverages) -> TrendAnalysis {
    let positions = [
        averages.price_vs_20sma,
        averages.price_vs_50sma,
        averages.price_vs_200sma,
    ];
    let above = positions
        .iter()
        .filter(|p| **p == PricePosition::Above)
        .count() as u8;
    let known = positions
        .iter()
        .filter(|p| **p != PricePosition::Unknown)
        .count();

    let overall_trend = if known == 0 {
        OverallTrend::Neutral
    } else {
        match above {
            3 => OverallTrend::StrongBullish,
            2 => OverallTrend::Bullish,
            1 => OverallTrend::Neutral,
            _ => OverallTrend::Bearish,
        }
    };

    TrendAnalysis {
        short_term: trend_leg(closes, 20),
        medium_term: trend_leg(closes, 50),
        long_term: trend_leg(closes, 200),
        overall_trend,
        trend_strength: above,
    }
}

fn compute_support_resistance(bars: &[Bar]) -> SupportResistance {
    let last = bars.last().expect("non-empty series");
    let pivot = (last.high + last.low + last.close) / 3.0;
    let r1 = 2.0 * pivot - last.low;
    let r2 = pivot + (last.high - last.low);
    let s1 = 2.0 * pivot - last.high;
    let s2 = pivot - (last.high - last.low);

    let year_high = bars.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let year_low = bars.iter().map(|b| b.low).fold(f64::MAX, f64::min);

    SupportResistance {
        resistance_levels: vec![
            PriceLevel {
                level: round2(r1),
                label: "R1 (Pivot)".to_string(),
            },
            PriceLevel {
                level: round2(r2),
                label: "R2 (Pivot)".to_string(),
            },
            PriceLevel {
                level: round2(year_high),
                label: "52-Week High".to_string(),
            },
        ],
        support_levels: vec![
            PriceLevel {
                level: round2(s1),
                label: "S1 (Pivot)".to_string(),
            },
            PriceLevel {
                level: round2(s2),
                label: "S2 (Pivot)".to_string(),
            },
            PriceLevel {
                level: round2(year_low),
                label: "52-Week Low".to_string(),
            },
        ],
        pivot_point: round2(pivot),
        nearest_resistance: round2(r1),
        nearest_support: round2(s1),
    }
}

fn analyze_volume(bars: &[Bar], closes: &[f64]) -> VolumeAnalysis {
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
    let tail_mean = |n: usize| -> f64 {
        let tail = &volumes[volumes.len().saturating_sub(n)..];
        if tail.is_empty() {
            0.0
        } else {
            tail.iter().sum::<f64>() / tail.len() as f64
        }
    };

    let avg_20 = tail_mean(20);
    let avg_50 = tail_mean(50);
    let current = *volumes.last().expect("non-empty series");
    let volume_ratio = if avg_20 > 0.0 { current / avg_20 } else { 1.0 };

    let price_change = if closes.len() >= 2 {
        closes[closes.len() - 1] - closes[closes.len() - 2]
    } else {
        0.0
    };

    let price_volume_signal = if price_change > 0.0 && volume_ratio > 1.2 {
        PriceVolumeSignal::BullishHighVolume
    } else if price_change < 0.0 && volume_ratio > 1.2 {
        PriceVolumeSignal::BearishHighVolume
    } else if price_change > 0.0 && volume_ratio < 0.8 {
        PriceVolumeSignal::WeakBullish
    } else if price_change < 0.0 && volume_ratio < 0.8 {
        PriceVolumeSignal::PotentialReversal
    } else {
        PriceVolumeSignal::Neutral
    };

    VolumeAnalysis {
        current_volume: current as u64,
        avg_volume_20: avg_20 as u64,
        avg_volume_50: avg_50 as u64,
        volume_ratio: round2(volume_ratio),
        volume_trend: if volume_ratio > 1.0 {
            VolumeTrend::AboveAverage
        } else {
            VolumeTrend::BelowAverage
        },
        price_volume_signal,
    }
}

fn generate_signals(indicators: &IndicatorSet) -> SignalSummary {
    let mut bullish = Vec::new();
    let mut bearish = Vec::new();

    match indicators.rsi.condition {
        RsiCondition::Oversold => bullish.push("RSI Oversold".to_string()),
        RsiCondition::Overbought => bearish.push("RSI Overbought".to_string()),
        _ => {}
    }

    match indicators.macd.signal_type {
        MacdSignal::BullishCrossover => bullish.push("MACD Bullish Crossover".to_string()),
        MacdSignal::Bullish => bullish.push("MACD Bullish".to_string()),
        MacdSignal::BearishCrossover => bearish.push("MACD Bearish Crossover".to_string()),
        MacdSignal::Bearish => bearish.push("MACD Bearish".to_string()),
        MacdSignal::Unknown => {}
    }

    match indicators.moving_averages.price_vs_200sma {
        PricePosition::Above => bullish.push("Price above 200 SMA".to_string()),
        PricePosition::Below => bearish.push("Price below 200 SMA".to_string()),
        PricePosition::Unknown => {}
    }

    match indicators.stochastic.condition {
        StochasticCondition::Oversold => bullish.push("Stochastic Oversold".to_string()),
        StochasticCondition::Overbought => bearish.push("Stochastic Overbought".to_string()),
        _ => {}
    }

    match indicators.bollinger_bands.position {
        BandPosition::NearLower => bullish.push("Price near lower Bollinger Band".to_string()),
        BandPosition::NearUpper => bearish.push("Price near upper Bollinger Band".to_string()),
        _ => {}
    }

    let bull_count = bullish.len();
    let bear_count = bearish.len();
    let overall_signal = if bull_count > bear_count + 1 {
        SignalBias::Bullish
    } else if bear_count > bull_count + 1 {
        SignalBias::Bearish
    } else {
        SignalBias::Neutral
    };

    SignalSummary {
        bullish_signals: bullish,
        bearish_signals: bearish,
        overall_signal,
        signal_strength: bull_count.abs_diff(bear_count) as u32,
    }
}

/// Confidence grows with signal agreement, capped at 0.9.
fn signal_confidence(signals: &SignalSummary) -> f64 {
    round2(0.5 + (signals.signal_strength as f64 * 0.1).min(0.4))
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
