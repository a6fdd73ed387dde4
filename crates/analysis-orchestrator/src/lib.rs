//! Pipeline orchestrator: market snapshot first, fundamental and technical
//! analysis in parallel, strategy aggregation last.
//!
//! Only the market-data stage can fail the pipeline — its output feeds the
//! other agents' context and the target-price estimate needs a current
//! price. A degraded fundamental or technical agent yields an error-status
//! envelope that flows into the aggregator as a low-information input.

use analysis_core::{
    AgentEnvelope, AnalysisError, FundamentalProfile, MarketDataProvider, MarketSnapshot,
    Narrator, QuickQuote, Recommendation, TechnicalProfile, TickerAgent, TickerSymbol,
};
use chrono::{DateTime, Utc};
use fundamental_analysis::FundamentalAgent;
use market_data::MarketDataAgent;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use strategy_engine::StrategyAgent;
use technical_analysis::TechnicalAgent;

pub mod compare;
pub use compare::{compare, ComparisonReport, TickerFailure};

/// Pipeline execution stage, logged as the request progresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    FetchingMarket,
    ParallelAnalysis,
    Aggregating,
    Done,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::FetchingMarket => "fetching_market",
            PipelineStage::ParallelAnalysis => "parallel_analysis",
            PipelineStage::Aggregating => "aggregating",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Terminal pipeline envelope: either every agent's output, or one
/// top-level failure naming the ticker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AnalysisReport {
    Success {
        ticker: String,
        company_name: String,
        market_data: AgentEnvelope<MarketSnapshot>,
        fundamental_analysis: AgentEnvelope<FundamentalProfile>,
        technical_analysis: AgentEnvelope<TechnicalProfile>,
        recommendation: AgentEnvelope<Recommendation>,
        generated_at: DateTime<Utc>,
    },
    Failed {
        ticker: String,
        error: String,
    },
}

impl AnalysisReport {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisReport::Success { .. })
    }

    pub fn ticker(&self) -> &str {
        match self {
            AnalysisReport::Success { ticker, .. } | AnalysisReport::Failed { ticker, .. } => {
                ticker
            }
        }
    }
}

pub struct AnalysisPipeline {
    market: MarketDataAgent,
    fundamental: FundamentalAgent,
    technical: TechnicalAgent,
    strategy: StrategyAgent,
}

impl AnalysisPipeline {
    pub fn new(provider: Arc<dyn MarketDataProvider>, narrator: Arc<dyn Narrator>) -> Self {
        Self {
            market: MarketDataAgent::new(Arc::clone(&provider), Arc::clone(&narrator)),
            fundamental: FundamentalAgent::new(Arc::clone(&provider), Arc::clone(&narrator)),
            technical: TechnicalAgent::new(provider, Arc::clone(&narrator)),
            strategy: StrategyAgent::new(narrator),
        }
    }

    /// Run the full pipeline for one ticker.
    pub async fn run(&self, ticker: &TickerSymbol) -> AnalysisReport {
        tracing::info!(ticker = %ticker, stage = %PipelineStage::FetchingMarket, "Starting analysis");

        let market = self.market.analyze(ticker).await;
        if market.is_error() {
            let error = format!(
                "Failed to fetch market data: {}",
                market.error.as_deref().unwrap_or("unknown error")
            );
            tracing::error!(ticker = %ticker, stage = %PipelineStage::Failed, error = %error, "Pipeline aborted");
            return AnalysisReport::Failed {
                ticker: ticker.base().to_string(),
                error,
            };
        }

        let company_name = market
            .data
            .as_ref()
            .map(|snapshot| snapshot.profile.name.clone())
            .unwrap_or_else(|| ticker.base().to_string());

        tracing::info!(ticker = %ticker, stage = %PipelineStage::ParallelAnalysis, "Running parallel analysis");
        let (fundamental, technical) = tokio::join!(
            self.fundamental.analyze(ticker),
            self.technical.analyze(ticker),
        );

        tracing::info!(ticker = %ticker, stage = %PipelineStage::Aggregating, "Generating recommendation");
        let recommendation = self
            .strategy
            .analyze(ticker, &market, &fundamental, &technical)
            .await;

        tracing::info!(ticker = %ticker, stage = %PipelineStage::Done, "Analysis complete");
        AnalysisReport::Success {
            ticker: ticker.base().to_string(),
            company_name,
            market_data: market,
            fundamental_analysis: fundamental,
            technical_analysis: technical,
            recommendation,
            generated_at: Utc::now(),
        }
    }

    /// Quick quote passthrough for the display endpoint.
    pub async fn quick_quote(&self, ticker: &TickerSymbol) -> Result<QuickQuote, AnalysisError> {
        self.market.quick_quote(ticker).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{AnalysisError, Bar, CompanyFacts, HistoryRange};
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubNarrator;

    #[async_trait]
    impl Narrator for StubNarrator {
        async fn narrate(
            &self,
            _persona: &str,
            _prompt: &str,
            _context: &serde_json::Value,
        ) -> String {
            "stub insight".to_string()
        }
    }

    /// Counting provider; `BADQUOTE` fails facts lookups, `fail_facts_after`
    /// limits how many facts calls succeed.
    struct StubProvider {
        facts_calls: AtomicUsize,
        history_calls: AtomicUsize,
        fail_all_facts: bool,
        fail_facts_after: Option<usize>,
    }

    impl StubProvider {
        fn healthy() -> Self {
            Self {
                facts_calls: AtomicUsize::new(0),
                history_calls: AtomicUsize::new(0),
                fail_all_facts: false,
                fail_facts_after: None,
            }
        }

        fn failing_facts() -> Self {
            Self {
                fail_all_facts: true,
                ..Self::healthy()
            }
        }
    }

    fn stub_facts() -> CompanyFacts {
        CompanyFacts {
            name: Some("Stub Industries".to_string()),
            current_price: Some(250.0),
            previous_close: Some(245.0),
            trailing_pe: Some(18.0),
            return_on_equity: Some(0.16),
            profit_margins: Some(0.12),
            revenue_growth: Some(0.14),
            current_ratio: Some(1.6),
            debt_to_equity: Some(0.4),
            free_cashflow: Some(1_000.0),
            fifty_two_week_high: Some(300.0),
            fifty_two_week_low: Some(200.0),
            ..CompanyFacts::default()
        }
    }

    fn stub_history() -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        (0..60)
            .map(|i| {
                let close = 200.0 + i as f64;
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

    #[async_trait]
    impl MarketDataProvider for StubProvider {
        async fn company_facts(
            &self,
            symbol: &TickerSymbol,
        ) -> Result<CompanyFacts, AnalysisError> {
            let call = self.facts_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_all_facts || symbol.base() == "BADQUOTE" {
                return Err(AnalysisError::NoData(format!("no quote for {symbol}")));
            }
            if let Some(limit) = self.fail_facts_after {
                if call > limit {
                    return Err(AnalysisError::ApiError("facts exhausted".to_string()));
                }
            }
            Ok(stub_facts())
        }

        async fn price_history(
            &self,
            _symbol: &TickerSymbol,
            _range: HistoryRange,
        ) -> Result<Vec<Bar>, AnalysisError> {
            self.history_calls.fetch_add(1, Ordering::SeqCst);
            Ok(stub_history())
        }
    }

    fn pipeline_with(provider: Arc<StubProvider>) -> AnalysisPipeline {
        AnalysisPipeline::new(provider, Arc::new(StubNarrator))
    }

    #[tokio::test]
    async fn market_failure_short_circuits_the_pipeline() {
        let provider = Arc::new(StubProvider::failing_facts());
        let pipeline = pipeline_with(Arc::clone(&provider));
        let ticker = TickerSymbol::parse("TCS").unwrap();

        let report = pipeline.run(&ticker).await;

        match report {
            AnalysisReport::Failed { ticker, error } => {
                assert_eq!(ticker, "TCS");
                assert!(error.starts_with("Failed to fetch market data:"));
            }
            AnalysisReport::Success { .. } => panic!("expected failure"),
        }
        // only the market agent touched the provider; the downstream agents
        // were never invoked
        assert_eq!(provider.facts_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.history_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn healthy_run_produces_full_report() {
        let provider = Arc::new(StubProvider::healthy());
        let pipeline = pipeline_with(Arc::clone(&provider));
        let ticker = TickerSymbol::parse("TCS").unwrap();

        let report = pipeline.run(&ticker).await;

        let AnalysisReport::Success {
            ticker,
            company_name,
            market_data,
            fundamental_analysis,
            technical_analysis,
            recommendation,
            ..
        } = report
        else {
            panic!("expected success");
        };

        assert_eq!(ticker, "TCS");
        assert_eq!(company_name, "Stub Industries");
        assert!(market_data.is_success());
        assert!(fundamental_analysis.is_success());
        assert!(technical_analysis.is_success());
        assert!(recommendation.is_success());
        let rec = recommendation.data.unwrap();
        assert!((0..=100).contains(&rec.scores.overall_score));
        assert!(rec.target_price.mid > 0.0);

        // market + fundamental facts, market + technical history
        assert_eq!(provider.facts_calls.load(Ordering::SeqCst), 2);
        assert_eq!(provider.history_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn degraded_sub_analysis_does_not_abort() {
        // first facts call (market agent) succeeds, second (fundamental) fails
        let provider = Arc::new(StubProvider {
            fail_facts_after: Some(1),
            ..StubProvider::healthy()
        });
        let pipeline = pipeline_with(provider);
        let ticker = TickerSymbol::parse("TCS").unwrap();

        let report = pipeline.run(&ticker).await;

        let AnalysisReport::Success {
            fundamental_analysis,
            technical_analysis,
            recommendation,
            ..
        } = report
        else {
            panic!("expected success despite degraded fundamental agent");
        };

        assert!(fundamental_analysis.is_error());
        assert!(technical_analysis.is_success());
        assert!(recommendation.is_success());
        // fundamental degraded to neutral: base score only
        let rec = recommendation.data.unwrap();
        assert_eq!(rec.scores.fundamental_score, 50);
    }

    #[tokio::test]
    async fn comparison_partitions_successes_and_failures() {
        let provider = Arc::new(StubProvider::healthy());
        let pipeline = Arc::new(pipeline_with(provider));
        let tickers = vec![
            TickerSymbol::parse("TCS").unwrap(),
            TickerSymbol::parse("BADQUOTE").unwrap(),
            TickerSymbol::parse("INFY").unwrap(),
        ];

        let report = compare(&pipeline, &tickers).await.unwrap();

        assert_eq!(report.total_requested, 3);
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].ticker, "BADQUOTE");
        // successes keep the requested order
        assert_eq!(report.results[0].ticker(), "TCS");
        assert_eq!(report.results[1].ticker(), "INFY");
    }

    #[tokio::test]
    async fn comparison_fails_only_when_nothing_succeeds() {
        let provider = Arc::new(StubProvider::failing_facts());
        let pipeline = Arc::new(pipeline_with(provider));
        let tickers = vec![
            TickerSymbol::parse("TCS").unwrap(),
            TickerSymbol::parse("INFY").unwrap(),
        ];

        let err = compare(&pipeline, &tickers).await.unwrap_err();
        assert!(matches!(err, AnalysisError::NoData(_)));
    }
}
