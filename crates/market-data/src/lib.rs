//! Market snapshot agent: quotes, valuation, 52-week range and trailing
//! returns for one ticker. This agent is the hard dependency of the
//! pipeline — the other agents reference its context and the target-price
//! estimate needs a current price.

use analysis_core::{
    round1, round2, AgentEnvelope, AnalysisError, Bar, CompanyFacts, CompanyProfile,
    FiftyTwoWeekRange, HistoryRange, MarketDataProvider, MarketSnapshot, Narrator, PriceData,
    QuickQuote, TickerAgent, TickerSymbol, TrailingReturns, ValuationSummary,
};
use async_trait::async_trait;
use chrono::{Datelike, TimeZone, Utc};
use std::sync::Arc;

pub const AGENT_NAME: &str = "Market Data Agent";
const PERSONA: &str = "specialist in fetching and interpreting Indian stock market data";

// Approximate trading days per calendar window.
const ONE_MONTH_BARS: usize = 22;
const THREE_MONTH_BARS: usize = 66;
const SIX_MONTH_BARS: usize = 132;

#[derive(Clone)]
pub struct MarketDataAgent {
    provider: Arc<dyn MarketDataProvider>,
    narrator: Arc<dyn Narrator>,
}

impl MarketDataAgent {
    pub fn new(provider: Arc<dyn MarketDataProvider>, narrator: Arc<dyn Narrator>) -> Self {
        Self { provider, narrator }
    }

    /// Quick quote for display. Unlike `analyze`, this surfaces failures to
    /// the caller directly.
    pub async fn quick_quote(&self, ticker: &TickerSymbol) -> Result<QuickQuote, AnalysisError> {
        let facts = self.provider.company_facts(ticker).await?;

        let price = facts
            .current_price
            .filter(|p| *p > 0.0)
            .ok_or_else(|| {
                AnalysisError::NoData(format!("No price data available for {ticker}"))
            })?;

        let previous_close = facts.previous_close.unwrap_or(0.0);
        let change = if previous_close > 0.0 {
            price - previous_close
        } else {
            0.0
        };
        let change_percent = if previous_close > 0.0 {
            change / previous_close * 100.0
        } else {
            0.0
        };

        Ok(QuickQuote {
            ticker: ticker.base().to_string(),
            name: facts.name.unwrap_or_else(|| ticker.base().to_string()),
            price: round2(price),
            change: round2(change),
            change_percent: round2(change_percent),
            volume: facts.volume.unwrap_or(0),
            market_cap: facts.market_cap,
        })
    }

    async fn build(&self, ticker: &TickerSymbol) -> Result<AgentEnvelope<MarketSnapshot>, AnalysisError> {
        let facts = self.provider.company_facts(ticker).await?;
        let history = self
            .provider
            .price_history(ticker, HistoryRange::OneYear)
            .await?;

        let snapshot = build_snapshot(ticker, &facts, history)?;

        let context = serde_json::json!({
            "price": snapshot.price.current_price,
            "pe_ratio": snapshot.valuation.pe_ratio,
            "52_week_position": format!("{:.1}% of 52-week range", snapshot.week_52.position_percent),
            "sector": &snapshot.profile.sector,
            "returns": &snapshot.returns,
        });
        let prompt = format!(
            "Analyze the market data for {} and provide key observations about its current \
             market position, valuation, and recent performance.",
            ticker.base()
        );
        let insight = self.narrator.narrate(PERSONA, &prompt, &context).await;

        Ok(AgentEnvelope::success(AGENT_NAME, snapshot, insight, 0.85))
    }
}

#[async_trait]
impl TickerAgent for MarketDataAgent {
    type Profile = MarketSnapshot;

    fn agent_name(&self) -> &'static str {
        AGENT_NAME
    }

    async fn analyze(&self, ticker: &TickerSymbol) -> AgentEnvelope<MarketSnapshot> {
        match self.build(ticker).await {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(ticker = %ticker, error = %err, "Market data analysis failed");
                AgentEnvelope::failure(AGENT_NAME, err)
            }
        }
    }
}

fn build_snapshot(
    ticker: &TickerSymbol,
    facts: &CompanyFacts,
    history: Vec<Bar>,
) -> Result<MarketSnapshot, AnalysisError> {
    let current_price = facts
        .current_price
        .filter(|p| *p > 0.0)
        .ok_or_else(|| AnalysisError::NoData(format!("No price data available for {ticker}")))?;

    let high_52w = facts.fifty_two_week_high;
    let low_52w = facts.fifty_two_week_low;
    let position_percent = match (high_52w, low_52w) {
        (Some(high), Some(low)) if high > low => {
            round1((current_price - low) / (high - low) * 100.0)
        }
        _ => 50.0,
    };

    let returns = TrailingReturns {
        ytd: ytd_return(&history),
        one_month: trailing_return(&history, ONE_MONTH_BARS),
        three_month: trailing_return(&history, THREE_MONTH_BARS),
        six_month: trailing_return(&history, SIX_MONTH_BARS),
        one_year: trailing_return(&history, history.len()),
    };

    Ok(MarketSnapshot {
        profile: CompanyProfile {
            name: facts
                .name
                .clone()
                .unwrap_or_else(|| ticker.base().to_string()),
            sector: facts.sector.clone(),
            industry: facts.industry.clone(),
            exchange: ticker.exchange(),
        },
        price: PriceData {
            current_price,
            previous_close: facts.previous_close.unwrap_or(0.0),
            open: facts.open.unwrap_or(0.0),
            day_high: facts.day_high.unwrap_or(0.0),
            day_low: facts.day_low.unwrap_or(0.0),
            volume: facts.volume.unwrap_or(0),
            avg_volume: facts.average_volume.unwrap_or(0),
        },
        valuation: ValuationSummary {
            market_cap: facts.market_cap,
            enterprise_value: facts.enterprise_value,
            pe_ratio: facts.trailing_pe.map(round2),
            forward_pe: facts.forward_pe.map(round2),
            pb_ratio: facts.price_to_book.map(round2),
        },
        week_52: FiftyTwoWeekRange {
            high: high_52w,
            low: low_52w,
            position_percent,
        },
        returns,
        history,
    })
}

/// Percent return over the trailing `window` bars. `None` when the series
/// is too short to span the window meaningfully.
fn trailing_return(bars: &[Bar], window: usize) -> Option<f64> {
    if bars.len() < 2 || window < 2 {
        return None;
    }
    let subset = if window >= bars.len() {
        bars
    } else {
        &bars[bars.len() - window..]
    };
    let start = subset.first()?.close;
    let end = subset.last()?.close;
    if start <= 0.0 {
        return None;
    }
    Some(round2((end - start) / start * 100.0))
}

/// Return since January 1 of the latest bar's calendar year.
fn ytd_return(bars: &[Bar]) -> Option<f64> {
    let last = bars.last()?;
    let year_start = Utc.with_ymd_and_hms(last.timestamp.year(), 1, 1, 0, 0, 0).single()?;
    let first_index = bars.iter().position(|b| b.timestamp >= year_start)?;
    let subset = &bars[first_index..];
    if subset.len() < 2 {
        return None;
    }
    let start = subset.first()?.close;
    if start <= 0.0 {
        return None;
    }
    Some(round2((last.close - start) / start * 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn bars_with_closes(closes: &[f64]) -> Vec<Bar> {
        let end = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: end - Duration::days((closes.len() - 1 - i) as i64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 1_000_000.0,
            })
            .collect()
    }

    fn facts_with_price(price: f64) -> CompanyFacts {
        CompanyFacts {
            name: Some("Test Company".to_string()),
            current_price: Some(price),
            previous_close: Some(price * 0.98),
            fifty_two_week_high: Some(price * 1.25),
            fifty_two_week_low: Some(price * 0.75),
            ..CompanyFacts::default()
        }
    }

    #[test]
    fn snapshot_requires_current_price() {
        let ticker = TickerSymbol::parse("TCS").unwrap();
        let facts = CompanyFacts::default();
        let err = build_snapshot(&ticker, &facts, bars_with_closes(&[100.0, 101.0])).unwrap_err();
        assert!(matches!(err, AnalysisError::NoData(_)));
    }

    #[test]
    fn position_in_52_week_range() {
        let ticker = TickerSymbol::parse("TCS").unwrap();
        let mut facts = facts_with_price(100.0);
        facts.fifty_two_week_high = Some(120.0);
        facts.fifty_two_week_low = Some(80.0);

        let snapshot = build_snapshot(&ticker, &facts, bars_with_closes(&[95.0, 100.0])).unwrap();
        assert_eq!(snapshot.week_52.position_percent, 50.0);
    }

    #[test]
    fn degenerate_range_defaults_to_midpoint() {
        let ticker = TickerSymbol::parse("TCS").unwrap();
        let mut facts = facts_with_price(100.0);
        facts.fifty_two_week_high = None;

        let snapshot = build_snapshot(&ticker, &facts, bars_with_closes(&[95.0, 100.0])).unwrap();
        assert_eq!(snapshot.week_52.position_percent, 50.0);
    }

    #[test]
    fn trailing_return_windows() {
        // 30 flat bars at 100, then 22 bars climbing to 110
        let mut closes = vec![100.0; 30];
        for i in 0..22 {
            closes.push(100.0 + (i as f64 + 1.0) * 10.0 / 22.0);
        }
        let bars = bars_with_closes(&closes);

        let one_month = trailing_return(&bars, 22).unwrap();
        assert!(one_month > 0.0);
        // full-series return: 100 -> 110
        assert_eq!(trailing_return(&bars, bars.len()), Some(10.0));
        // short series has no 2-bar window
        assert_eq!(trailing_return(&bars[..1], 22), None);
        assert_eq!(trailing_return(&[], 22), None);
    }

    #[test]
    fn ytd_uses_calendar_year_of_last_bar() {
        // bars span the year boundary; only bars from the last year count
        let bars = vec![
            Bar {
                timestamp: Utc.with_ymd_and_hms(2024, 12, 30, 0, 0, 0).unwrap(),
                open: 90.0,
                high: 91.0,
                low: 89.0,
                close: 90.0,
                volume: 1.0,
            },
            Bar {
                timestamp: Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0,
                volume: 1.0,
            },
            Bar {
                timestamp: Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap(),
                open: 108.0,
                high: 109.0,
                low: 107.0,
                close: 108.0,
                volume: 1.0,
            },
        ];
        assert_eq!(ytd_return(&bars), Some(8.0));
    }
}
