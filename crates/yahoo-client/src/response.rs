//! Typed wire formats for the Yahoo Finance v8/v10 endpoints.

use serde::Deserialize;

/// Yahoo wraps most numbers as `{"raw": 123.4, "fmt": "123.40"}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNum {
    pub raw: Option<f64>,
}

impl RawNum {
    pub fn value(&self) -> Option<f64> {
        self.raw
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.raw.map(|v| v as u64)
    }
}

fn raw(field: &Option<RawNum>) -> Option<f64> {
    field.as_ref().and_then(RawNum::value)
}

fn raw_u64(field: &Option<RawNum>) -> Option<u64> {
    field.as_ref().and_then(RawNum::as_u64)
}

#[derive(Debug, Deserialize)]
pub struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    pub quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
pub struct QuoteSummaryBody {
    #[serde(default)]
    pub result: Option<Vec<QuoteSummaryResult>>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuoteSummaryResult {
    #[serde(default)]
    pub price: Option<PriceModule>,
    #[serde(rename = "summaryProfile", default)]
    pub summary_profile: Option<SummaryProfileModule>,
    #[serde(rename = "summaryDetail", default)]
    pub summary_detail: Option<SummaryDetailModule>,
    #[serde(rename = "financialData", default)]
    pub financial_data: Option<FinancialDataModule>,
    #[serde(rename = "defaultKeyStatistics", default)]
    pub key_statistics: Option<KeyStatisticsModule>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PriceModule {
    #[serde(rename = "longName", default)]
    pub long_name: Option<String>,
    #[serde(rename = "shortName", default)]
    pub short_name: Option<String>,
    #[serde(rename = "regularMarketPrice", default)]
    pub regular_market_price: Option<RawNum>,
    #[serde(rename = "regularMarketPreviousClose", default)]
    pub regular_market_previous_close: Option<RawNum>,
    #[serde(rename = "regularMarketOpen", default)]
    pub regular_market_open: Option<RawNum>,
    #[serde(rename = "regularMarketDayHigh", default)]
    pub regular_market_day_high: Option<RawNum>,
    #[serde(rename = "regularMarketDayLow", default)]
    pub regular_market_day_low: Option<RawNum>,
    #[serde(rename = "regularMarketVolume", default)]
    pub regular_market_volume: Option<RawNum>,
    #[serde(rename = "averageDailyVolume3Month", default)]
    pub average_daily_volume_3_month: Option<RawNum>,
    #[serde(rename = "marketCap", default)]
    pub market_cap: Option<RawNum>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryProfileModule {
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryDetailModule {
    #[serde(rename = "trailingPE", default)]
    pub trailing_pe: Option<RawNum>,
    #[serde(rename = "forwardPE", default)]
    pub forward_pe: Option<RawNum>,
    #[serde(rename = "priceToSalesTrailing12Months", default)]
    pub price_to_sales: Option<RawNum>,
    #[serde(rename = "fiftyTwoWeekHigh", default)]
    pub fifty_two_week_high: Option<RawNum>,
    #[serde(rename = "fiftyTwoWeekLow", default)]
    pub fifty_two_week_low: Option<RawNum>,
    #[serde(rename = "dividendYield", default)]
    pub dividend_yield: Option<RawNum>,
    #[serde(rename = "dividendRate", default)]
    pub dividend_rate: Option<RawNum>,
    #[serde(rename = "payoutRatio", default)]
    pub payout_ratio: Option<RawNum>,
    #[serde(rename = "averageVolume", default)]
    pub average_volume: Option<RawNum>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FinancialDataModule {
    #[serde(rename = "currentPrice", default)]
    pub current_price: Option<RawNum>,
    #[serde(rename = "grossMargins", default)]
    pub gross_margins: Option<RawNum>,
    #[serde(rename = "operatingMargins", default)]
    pub operating_margins: Option<RawNum>,
    #[serde(rename = "profitMargins", default)]
    pub profit_margins: Option<RawNum>,
    #[serde(rename = "returnOnEquity", default)]
    pub return_on_equity: Option<RawNum>,
    #[serde(rename = "returnOnAssets", default)]
    pub return_on_assets: Option<RawNum>,
    #[serde(rename = "revenueGrowth", default)]
    pub revenue_growth: Option<RawNum>,
    #[serde(rename = "earningsGrowth", default)]
    pub earnings_growth: Option<RawNum>,
    #[serde(rename = "revenuePerShare", default)]
    pub revenue_per_share: Option<RawNum>,
    #[serde(rename = "totalRevenue", default)]
    pub total_revenue: Option<RawNum>,
    #[serde(rename = "currentRatio", default)]
    pub current_ratio: Option<RawNum>,
    #[serde(rename = "quickRatio", default)]
    pub quick_ratio: Option<RawNum>,
    #[serde(rename = "debtToEquity", default)]
    pub debt_to_equity: Option<RawNum>,
    #[serde(rename = "totalDebt", default)]
    pub total_debt: Option<RawNum>,
    #[serde(rename = "totalCash", default)]
    pub total_cash: Option<RawNum>,
    #[serde(rename = "operatingCashflow", default)]
    pub operating_cashflow: Option<RawNum>,
    #[serde(rename = "freeCashflow", default)]
    pub free_cashflow: Option<RawNum>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KeyStatisticsModule {
    #[serde(rename = "enterpriseValue", default)]
    pub enterprise_value: Option<RawNum>,
    #[serde(rename = "priceToBook", default)]
    pub price_to_book: Option<RawNum>,
    #[serde(rename = "pegRatio", default)]
    pub peg_ratio: Option<RawNum>,
    #[serde(rename = "enterpriseToEbitda", default)]
    pub enterprise_to_ebitda: Option<RawNum>,
    #[serde(rename = "earningsQuarterlyGrowth", default)]
    pub earnings_quarterly_growth: Option<RawNum>,
}

impl QuoteSummaryResult {
    /// Flatten the module soup into the loosely-typed facts mapping.
    /// `debtToEquity` arrives as a percentage and is normalized to a ratio
    /// here so every downstream threshold works in one unit convention.
    pub fn into_company_facts(self) -> analysis_core::CompanyFacts {
        let price = self.price.unwrap_or_default();
        let profile = self.summary_profile.unwrap_or_default();
        let detail = self.summary_detail.unwrap_or_default();
        let financial = self.financial_data.unwrap_or_default();
        let stats = self.key_statistics.unwrap_or_default();

        analysis_core::CompanyFacts {
            name: price.long_name.or(price.short_name),
            sector: profile.sector,
            industry: profile.industry,

            current_price: raw(&financial.current_price)
                .or_else(|| raw(&price.regular_market_price)),
            previous_close: raw(&price.regular_market_previous_close),
            open: raw(&price.regular_market_open),
            day_high: raw(&price.regular_market_day_high),
            day_low: raw(&price.regular_market_day_low),
            volume: raw_u64(&price.regular_market_volume),
            average_volume: raw_u64(&detail.average_volume)
                .or_else(|| raw_u64(&price.average_daily_volume_3_month)),

            market_cap: raw(&price.market_cap),
            enterprise_value: raw(&stats.enterprise_value),
            trailing_pe: raw(&detail.trailing_pe),
            forward_pe: raw(&detail.forward_pe),
            price_to_book: raw(&stats.price_to_book),
            peg_ratio: raw(&stats.peg_ratio),
            price_to_sales: raw(&detail.price_to_sales),
            ev_to_ebitda: raw(&stats.enterprise_to_ebitda),

            fifty_two_week_high: raw(&detail.fifty_two_week_high),
            fifty_two_week_low: raw(&detail.fifty_two_week_low),

            gross_margins: raw(&financial.gross_margins),
            operating_margins: raw(&financial.operating_margins),
            profit_margins: raw(&financial.profit_margins),
            return_on_equity: raw(&financial.return_on_equity),
            return_on_assets: raw(&financial.return_on_assets),

            revenue_growth: raw(&financial.revenue_growth),
            earnings_growth: raw(&financial.earnings_growth),
            earnings_quarterly_growth: raw(&stats.earnings_quarterly_growth),
            revenue_per_share: raw(&financial.revenue_per_share),
            total_revenue: raw(&financial.total_revenue),

            current_ratio: raw(&financial.current_ratio),
            quick_ratio: raw(&financial.quick_ratio),
            debt_to_equity: raw(&financial.debt_to_equity).map(|pct| pct / 100.0),
            total_debt: raw(&financial.total_debt),
            total_cash: raw(&financial.total_cash),

            operating_cashflow: raw(&financial.operating_cashflow),
            free_cashflow: raw(&financial.free_cashflow),

            dividend_yield: raw(&detail.dividend_yield),
            payout_ratio: raw(&detail.payout_ratio),
            dividend_rate: raw(&detail.dividend_rate),
        }
    }
}

// --- chart endpoint -------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub chart: ChartBody,
}

#[derive(Debug, Deserialize)]
pub struct ChartBody {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
}

/// Per-field arrays aligned with `timestamp`; individual slots may be null
/// on holidays or partial sessions.
#[derive(Debug, Default, Deserialize)]
pub struct ChartQuote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}
