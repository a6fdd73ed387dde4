//! Quote and history client for the Yahoo Finance endpoints, with a bounded
//! TTL cache in front of each lookup and transient-only retry.

use analysis_core::{
    AnalysisError, Bar, CompanyFacts, HistoryRange, MarketDataProvider, TickerSymbol,
};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

mod cache;
mod response;
mod retry;

pub use cache::TtlCache;
pub use retry::RetryPolicy;

use response::{ChartEnvelope, QuoteSummaryEnvelope};

const BASE_URL: &str = "https://query1.finance.yahoo.com";
const QUOTE_SUMMARY_MODULES: &str =
    "price,summaryProfile,summaryDetail,financialData,defaultKeyStatistics";

#[derive(Debug, Clone)]
pub struct YahooClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub retry: RetryPolicy,
}

impl Default for YahooClientConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 100,
            retry: RetryPolicy::default(),
        }
    }
}

pub struct YahooClient {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
    facts_cache: TtlCache<CompanyFacts>,
    history_cache: TtlCache<Vec<Bar>>,
}

impl YahooClient {
    pub fn new(config: YahooClientConfig) -> Self {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent("Mozilla/5.0 (compatible; analysis-pipeline)")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: config.retry,
            facts_cache: TtlCache::new(config.cache_ttl, config.cache_capacity),
            history_cache: TtlCache::new(config.cache_ttl, config.cache_capacity),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(YahooClientConfig::default())
    }

    /// Issue one GET and decode the body, mapping failures onto the error
    /// taxonomy. 429 and 5xx are transient; 404 means the symbol has no data.
    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, AnalysisError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AnalysisError::RateLimited(format!("HTTP 429 from {url}")));
        }
        if status.as_u16() == 404 {
            return Err(AnalysisError::NoData(format!("HTTP 404 from {url}")));
        }
        if status.is_server_error() {
            return Err(AnalysisError::ConnectionError(format!(
                "HTTP {status} from {url}"
            )));
        }
        if !status.is_success() {
            return Err(AnalysisError::ApiError(format!("HTTP {status} from {url}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AnalysisError::DecodeError(e.to_string()))
    }

    /// GET with bounded exponential-backoff retry on transient failures only.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, AnalysisError> {
        let mut attempt = 0u32;
        loop {
            match self.get_once(url, query).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt + 1 < self.retry.max_attempts => {
                    let delay = self.retry.delay(attempt);
                    tracing::warn!(
                        url,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient provider failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Company info mapping for a symbol (cached).
    pub async fn company_facts(
        &self,
        symbol: &TickerSymbol,
    ) -> Result<CompanyFacts, AnalysisError> {
        let cache_key = format!("facts:{}", symbol.qualified());
        if let Some(facts) = self.facts_cache.get(&cache_key) {
            tracing::debug!(symbol = %symbol, "Company facts cache hit");
            return Ok(facts);
        }

        let url = format!(
            "{}/v10/finance/quoteSummary/{}",
            self.base_url,
            symbol.qualified()
        );
        let envelope: QuoteSummaryEnvelope = self
            .get_json(&url, &[("modules", QUOTE_SUMMARY_MODULES)])
            .await?;

        let body = envelope.quote_summary;
        let result = body.result.and_then(|mut results| {
            if results.is_empty() {
                None
            } else {
                Some(results.remove(0))
            }
        });
        let Some(result) = result else {
            let detail = body
                .error
                .and_then(|e| e.description.or(e.code))
                .unwrap_or_else(|| format!("No quote data returned for {symbol}"));
            return Err(AnalysisError::NoData(detail));
        };

        let facts = result.into_company_facts();
        self.facts_cache.insert(cache_key, facts.clone());
        Ok(facts)
    }

    /// Daily OHLCV history for a symbol over a lookback range (cached).
    pub async fn price_history(
        &self,
        symbol: &TickerSymbol,
        range: HistoryRange,
    ) -> Result<Vec<Bar>, AnalysisError> {
        let cache_key = format!("history:{}:{}", symbol.qualified(), range.as_str());
        if let Some(bars) = self.history_cache.get(&cache_key) {
            tracing::debug!(symbol = %symbol, range = range.as_str(), "History cache hit");
            return Ok(bars);
        }

        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol.qualified());
        let envelope: ChartEnvelope = self
            .get_json(&url, &[("range", range.as_str()), ("interval", "1d")])
            .await?;

        if let Some(error) = envelope.chart.error {
            return Err(AnalysisError::NoData(format!(
                "{}: {}",
                error.code.unwrap_or_else(|| "chart error".into()),
                error.description.unwrap_or_default()
            )));
        }

        let result = envelope
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0))
                }
            })
            .ok_or_else(|| {
                AnalysisError::NoData(format!("No historical data available for {symbol}"))
            })?;

        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
        let bars = assemble_bars(&result.timestamp, &quote);

        if bars.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "Historical series for {symbol} is empty"
            )));
        }

        self.history_cache.insert(cache_key, bars.clone());
        Ok(bars)
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn company_facts(&self, symbol: &TickerSymbol) -> Result<CompanyFacts, AnalysisError> {
        YahooClient::company_facts(self, symbol).await
    }

    async fn price_history(
        &self,
        symbol: &TickerSymbol,
        range: HistoryRange,
    ) -> Result<Vec<Bar>, AnalysisError> {
        YahooClient::price_history(self, symbol, range).await
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> AnalysisError {
    if err.is_timeout() {
        AnalysisError::TimeoutError(err.to_string())
    } else if err.is_connect() {
        AnalysisError::ConnectionError(err.to_string())
    } else {
        AnalysisError::ApiError(err.to_string())
    }
}

/// Zip the per-field arrays into bars, skipping slots with missing prices.
fn assemble_bars(timestamps: &[i64], quote: &response::ChartQuote) -> Vec<Bar> {
    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let close = quote.close.get(i).copied().flatten();
        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        let (Some(close), Some(open), Some(high), Some(low)) = (close, open, high, low) else {
            continue;
        };
        let Some(timestamp) = DateTime::from_timestamp(ts, 0) else {
            continue;
        };
        bars.push(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0.0),
        });
    }
    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::QuoteSummaryResult;

    #[test]
    fn maps_quote_summary_to_facts() {
        let body = serde_json::json!({
            "price": {
                "longName": "Reliance Industries Limited",
                "regularMarketPrice": {"raw": 2890.5, "fmt": "2,890.50"},
                "regularMarketPreviousClose": {"raw": 2850.0},
                "regularMarketVolume": {"raw": 5_000_000.0},
                "marketCap": {"raw": 1.95e13}
            },
            "summaryProfile": {"sector": "Energy", "industry": "Oil & Gas Refining"},
            "summaryDetail": {
                "trailingPE": {"raw": 28.4},
                "fiftyTwoWeekHigh": {"raw": 3024.0},
                "fiftyTwoWeekLow": {"raw": 2221.0},
                "dividendYield": {"raw": 0.0031}
            },
            "financialData": {
                "grossMargins": {"raw": 0.35},
                "profitMargins": {"raw": 0.082},
                "returnOnEquity": {"raw": 0.089},
                "revenueGrowth": {"raw": 0.12},
                "currentRatio": {"raw": 1.18},
                "debtToEquity": {"raw": 41.3}
            },
            "defaultKeyStatistics": {
                "priceToBook": {"raw": 2.1},
                "pegRatio": {"raw": 2.4}
            }
        });
        let result: QuoteSummaryResult = serde_json::from_value(body).unwrap();
        let facts = result.into_company_facts();

        assert_eq!(facts.name.as_deref(), Some("Reliance Industries Limited"));
        assert_eq!(facts.current_price, Some(2890.5));
        assert_eq!(facts.trailing_pe, Some(28.4));
        assert_eq!(facts.profit_margins, Some(0.082));
        // percentage feed normalized to a ratio at the boundary
        assert!((facts.debt_to_equity.unwrap() - 0.413).abs() < 1e-9);
        assert_eq!(facts.volume, Some(5_000_000));
    }

    #[test]
    fn missing_modules_yield_empty_facts() {
        let result: QuoteSummaryResult = serde_json::from_value(serde_json::json!({})).unwrap();
        let facts = result.into_company_facts();
        assert!(facts.name.is_none());
        assert!(facts.current_price.is_none());
        assert!(facts.debt_to_equity.is_none());
    }

    #[test]
    fn assemble_bars_skips_null_rows() {
        let quote = response::ChartQuote {
            open: vec![Some(10.0), None, Some(12.0)],
            high: vec![Some(11.0), Some(11.5), Some(13.0)],
            low: vec![Some(9.5), Some(10.5), Some(11.8)],
            close: vec![Some(10.5), Some(11.0), Some(12.5)],
            volume: vec![Some(1000.0), Some(900.0), None],
        };
        let bars = assemble_bars(&[1_700_000_000, 1_700_086_400, 1_700_172_800], &quote);

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 10.5);
        assert_eq!(bars[1].close, 12.5);
        assert_eq!(bars[1].volume, 0.0);
    }

    #[test]
    fn chart_envelope_decodes_error_body() {
        let json = serde_json::json!({
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found"}
            }
        });
        let envelope: ChartEnvelope = serde_json::from_value(json).unwrap();
        assert!(envelope.chart.result.is_none());
        assert_eq!(
            envelope.chart.error.unwrap().code.as_deref(),
            Some("Not Found")
        );
    }
}
