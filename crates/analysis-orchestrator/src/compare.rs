//! Multi-ticker comparison: best-effort concurrent fan-out.
//!
//! Policy: gather every result, partition into successes and failures,
//! proceed with the successes, and fail the whole request only when no
//! ticker succeeded.

use crate::{AnalysisPipeline, AnalysisReport};
use analysis_core::{AnalysisError, TickerSymbol};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerFailure {
    pub ticker: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Successful reports, in the requested ticker order.
    pub results: Vec<AnalysisReport>,
    pub failures: Vec<TickerFailure>,
    pub total_requested: usize,
    pub generated_at: DateTime<Utc>,
}

pub async fn compare(
    pipeline: &Arc<AnalysisPipeline>,
    tickers: &[TickerSymbol],
) -> Result<ComparisonReport, AnalysisError> {
    tracing::info!(count = tickers.len(), "Starting comparison analysis");

    let mut tasks = JoinSet::new();
    for ticker in tickers {
        let pipeline = Arc::clone(pipeline);
        let ticker = ticker.clone();
        tasks.spawn(async move { pipeline.run(&ticker).await });
    }

    let mut successes = Vec::new();
    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(report @ AnalysisReport::Success { .. }) => successes.push(report),
            Ok(AnalysisReport::Failed { ticker, error }) => {
                tracing::warn!(ticker = %ticker, error = %error, "Ticker failed during comparison");
                failures.push(TickerFailure { ticker, error });
            }
            Err(join_error) => {
                tracing::error!(error = %join_error, "Comparison task aborted");
            }
        }
    }

    if successes.is_empty() {
        return Err(AnalysisError::NoData(format!(
            "All {} tickers failed to analyze",
            tickers.len()
        )));
    }

    // JoinSet yields completion order; restore the requested order.
    let requested: Vec<&str> = tickers.iter().map(|t| t.base()).collect();
    successes.sort_by_key(|report| {
        requested
            .iter()
            .position(|base| *base == report.ticker())
            .unwrap_or(usize::MAX)
    });

    Ok(ComparisonReport {
        results: successes,
        failures,
        total_requested: tickers.len(),
        generated_at: Utc::now(),
    })
}
