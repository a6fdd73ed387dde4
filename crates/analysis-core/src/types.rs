use crate::symbol::Exchange;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Lookback window accepted by the history endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryRange {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "max")]
    Max,
}

impl HistoryRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryRange::OneDay => "1d",
            HistoryRange::FiveDays => "5d",
            HistoryRange::OneMonth => "1mo",
            HistoryRange::ThreeMonths => "3mo",
            HistoryRange::SixMonths => "6mo",
            HistoryRange::OneYear => "1y",
            HistoryRange::TwoYears => "2y",
            HistoryRange::FiveYears => "5y",
            HistoryRange::Max => "max",
        }
    }
}

/// Loosely-typed company information from the quote provider.
///
/// The upstream payload carries no schema guarantee, so every field is
/// optional and read through plain `Option` access. Margins, returns and
/// growth rates are fractional (0.15 = 15%); `debt_to_equity` is a ratio,
/// normalized once at the provider boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyFacts {
    pub name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,

    pub current_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub open: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub volume: Option<u64>,
    pub average_volume: Option<u64>,

    pub market_cap: Option<f64>,
    pub enterprise_value: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub forward_pe: Option<f64>,
    pub price_to_book: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub price_to_sales: Option<f64>,
    pub ev_to_ebitda: Option<f64>,

    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,

    pub gross_margins: Option<f64>,
    pub operating_margins: Option<f64>,
    pub profit_margins: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub return_on_assets: Option<f64>,

    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub earnings_quarterly_growth: Option<f64>,
    pub revenue_per_share: Option<f64>,
    pub total_revenue: Option<f64>,

    pub current_ratio: Option<f64>,
    pub quick_ratio: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub total_debt: Option<f64>,
    pub total_cash: Option<f64>,

    pub operating_cashflow: Option<f64>,
    pub free_cashflow: Option<f64>,

    pub dividend_yield: Option<f64>,
    pub payout_ratio: Option<f64>,
    pub dividend_rate: Option<f64>,
}

/// Basic company identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub exchange: Exchange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceData {
    pub current_price: f64,
    pub previous_close: f64,
    pub open: f64,
    pub day_high: f64,
    pub day_low: f64,
    pub volume: u64,
    pub avg_volume: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationSummary {
    pub market_cap: Option<f64>,
    pub enterprise_value: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub forward_pe: Option<f64>,
    pub pb_ratio: Option<f64>,
}

/// 52-week range with the current price's percentile position inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiftyTwoWeekRange {
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub position_percent: f64,
}

/// Trailing returns over the standard lookback windows, in percent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrailingReturns {
    pub ytd: Option<f64>,
    pub one_month: Option<f64>,
    pub three_month: Option<f64>,
    pub six_month: Option<f64>,
    pub one_year: Option<f64>,
}

/// Structured market snapshot for one ticker. Built once per analysis
/// request; read-only afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub profile: CompanyProfile,
    pub price: PriceData,
    pub valuation: ValuationSummary,
    pub week_52: FiftyTwoWeekRange,
    pub returns: TrailingReturns,
    pub history: Vec<Bar>,
}

/// Lightweight quote for the display endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickQuote {
    pub ticker: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub market_cap: Option<f64>,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Fraction to percent, rounded to two decimals.
pub fn to_percent(fraction: f64) -> f64 {
    round2(fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_helpers() {
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round1(12.345), 12.3);
        assert_eq!(to_percent(0.1567), 15.67);
    }

    #[test]
    fn history_range_tokens() {
        assert_eq!(HistoryRange::OneYear.as_str(), "1y");
        assert_eq!(HistoryRange::Max.as_str(), "max");
        let json = serde_json::to_string(&HistoryRange::ThreeMonths).unwrap();
        assert_eq!(json, "\"3mo\"");
    }
}
