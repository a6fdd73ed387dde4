use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Fundamental profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfitabilityRating {
    Strong,
    Good,
    Moderate,
    Weak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValuationRating {
    #[serde(rename = "Undervalued (PEG < 1)")]
    Undervalued,
    #[serde(rename = "Attractively valued")]
    Attractive,
    #[serde(rename = "Fairly valued")]
    Fair,
    #[serde(rename = "Premium valuation")]
    Premium,
    Expensive,
    #[serde(rename = "Negative earnings")]
    NegativeEarnings,
    #[serde(rename = "Unable to assess")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthRating {
    Strong,
    Healthy,
    Moderate,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthRating {
    #[serde(rename = "High Growth")]
    HighGrowth,
    #[serde(rename = "Moderate Growth")]
    ModerateGrowth,
    #[serde(rename = "Low Growth")]
    LowGrowth,
    Declining,
    #[serde(rename = "Unable to assess")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CashFlowRating {
    Positive,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
}

/// Margin and return metrics, in percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitabilityMetrics {
    pub gross_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub profit_margin: Option<f64>,
    pub roe: Option<f64>,
    pub roa: Option<f64>,
    pub assessment: ProfitabilityRating,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationMetrics {
    pub pe_ratio: Option<f64>,
    pub forward_pe: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub ps_ratio: Option<f64>,
    pub ev_to_ebitda: Option<f64>,
    pub assessment: ValuationRating,
}

/// Balance-sheet health. `debt_to_equity` is a ratio, not a percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheetMetrics {
    pub current_ratio: Option<f64>,
    pub quick_ratio: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub total_debt: Option<f64>,
    pub total_cash: Option<f64>,
    pub net_debt: Option<f64>,
    pub assessment: HealthRating,
}

/// Growth rates in percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthMetrics {
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub earnings_quarterly_growth: Option<f64>,
    pub revenue_per_share: Option<f64>,
    pub assessment: GrowthRating,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowMetrics {
    pub operating_cash_flow: Option<f64>,
    pub free_cash_flow: Option<f64>,
    pub fcf_margin: Option<f64>,
    pub assessment: CashFlowRating,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DividendMetrics {
    pub dividend_yield: Option<f64>,
    pub payout_ratio: Option<f64>,
    pub dividend_rate: Option<f64>,
    pub is_dividend_payer: bool,
}

/// Per-category fundamental assessments for one company. Produced once;
/// immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundamentalProfile {
    pub profitability: ProfitabilityMetrics,
    pub valuation: ValuationMetrics,
    pub financial_health: BalanceSheetMetrics,
    pub growth: GrowthMetrics,
    pub cash_flow: CashFlowMetrics,
    pub dividends: DividendMetrics,
}

// ---------------------------------------------------------------------------
// Technical profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricePosition {
    Above,
    Below,
    #[serde(rename = "N/A")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiCondition {
    Overbought,
    Oversold,
    Bullish,
    Bearish,
    #[serde(rename = "N/A")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacdSignal {
    #[serde(rename = "Bullish Crossover")]
    BullishCrossover,
    #[serde(rename = "Bearish Crossover")]
    BearishCrossover,
    Bullish,
    Bearish,
    #[serde(rename = "N/A")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StochasticCondition {
    Overbought,
    Oversold,
    Neutral,
    #[serde(rename = "N/A")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityLevel {
    #[serde(rename = "High Volatility")]
    High,
    #[serde(rename = "Moderate Volatility")]
    Moderate,
    #[serde(rename = "Low Volatility")]
    Low,
    #[serde(rename = "N/A")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BandPosition {
    #[serde(rename = "Near Upper Band")]
    NearUpper,
    #[serde(rename = "Near Lower Band")]
    NearLower,
    Middle,
    #[serde(rename = "N/A")]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingAverages {
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub ema_12: Option<f64>,
    pub ema_26: Option<f64>,
    pub price_vs_20sma: PricePosition,
    pub price_vs_50sma: PricePosition,
    pub price_vs_200sma: PricePosition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiReading {
    pub current: Option<f64>,
    pub condition: RsiCondition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdReading {
    pub macd_line: Option<f64>,
    pub signal_line: Option<f64>,
    pub histogram: Option<f64>,
    pub signal_type: MacdSignal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BollingerReading {
    pub upper: Option<f64>,
    pub middle: Option<f64>,
    pub lower: Option<f64>,
    pub position: BandPosition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StochasticReading {
    pub k: Option<f64>,
    pub d: Option<f64>,
    pub condition: StochasticCondition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtrReading {
    pub value: Option<f64>,
    pub volatility: VolatilityLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub moving_averages: MovingAverages,
    pub rsi: RsiReading,
    pub macd: MacdReading,
    pub bollinger_bands: BollingerReading,
    pub stochastic: StochasticReading,
    pub atr: AtrReading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Bullish,
    Bearish,
    #[serde(rename = "N/A")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallTrend {
    #[serde(rename = "Strong Bullish")]
    StrongBullish,
    Bullish,
    Neutral,
    Bearish,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendLeg {
    pub direction: TrendDirection,
    pub change_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub short_term: TrendLeg,
    pub medium_term: TrendLeg,
    pub long_term: TrendLeg,
    pub overall_trend: OverallTrend,
    /// Number of tracked moving averages the price sits above (0-3).
    pub trend_strength: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceLevel {
    pub level: f64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportResistance {
    pub resistance_levels: Vec<PriceLevel>,
    pub support_levels: Vec<PriceLevel>,
    pub pivot_point: f64,
    pub nearest_resistance: f64,
    pub nearest_support: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeTrend {
    #[serde(rename = "Above Average")]
    AboveAverage,
    #[serde(rename = "Below Average")]
    BelowAverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceVolumeSignal {
    #[serde(rename = "Bullish (Up on high volume)")]
    BullishHighVolume,
    #[serde(rename = "Bearish (Down on high volume)")]
    BearishHighVolume,
    #[serde(rename = "Weak bullish (Up on low volume)")]
    WeakBullish,
    #[serde(rename = "Potential reversal (Down on low volume)")]
    PotentialReversal,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeAnalysis {
    pub current_volume: u64,
    pub avg_volume_20: u64,
    pub avg_volume_50: u64,
    pub volume_ratio: f64,
    pub volume_trend: VolumeTrend,
    pub price_volume_signal: PriceVolumeSignal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalBias {
    Bullish,
    Neutral,
    Bearish,
}

/// Named bullish/bearish signals with the net strength count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalSummary {
    pub bullish_signals: Vec<String>,
    pub bearish_signals: Vec<String>,
    pub overall_signal: SignalBias,
    pub signal_strength: u32,
}

/// Indicator values, trend, levels and signals for one ticker. Produced
/// once; immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalProfile {
    pub indicators: IndicatorSet,
    pub trend: TrendAnalysis,
    pub support_resistance: SupportResistance,
    pub volume: VolumeAnalysis,
    pub signals: SignalSummary,
    pub current_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_serialize_to_human_strings() {
        assert_eq!(
            serde_json::to_string(&ValuationRating::Undervalued).unwrap(),
            "\"Undervalued (PEG < 1)\""
        );
        assert_eq!(
            serde_json::to_string(&GrowthRating::HighGrowth).unwrap(),
            "\"High Growth\""
        );
        assert_eq!(
            serde_json::to_string(&OverallTrend::StrongBullish).unwrap(),
            "\"Strong Bullish\""
        );
        assert_eq!(
            serde_json::to_string(&VolatilityLevel::High).unwrap(),
            "\"High Volatility\""
        );
        assert_eq!(
            serde_json::to_string(&HealthRating::NeedsAttention).unwrap(),
            "\"Needs Attention\""
        );
    }
}
