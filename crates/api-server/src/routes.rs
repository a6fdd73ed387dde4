//! API Routes
//!
//! `/quote` serves the lightweight display quote; `/analyze` runs the full
//! agent pipeline; `/compare` fans the pipeline out over 2-5 tickers.

use crate::{ApiError, ApiResponse, AppState};
use analysis_core::{AnalysisError, QuickQuote, TickerSymbol};
use analysis_orchestrator::{compare, AnalysisReport, ComparisonReport};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(root, health, get_quote, analyze_ticker, compare_tickers),
    tags((name = "Analysis", description = "Multi-agent stock analysis for NSE/BSE tickers"))
)]
struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/quote/:ticker", get(get_quote))
        .route("/analyze/:ticker", get(analyze_ticker))
        .route("/compare", get(compare_tickers))
        .route("/api/openapi.json", get(openapi_doc))
}

#[derive(Serialize, utoipa::ToSchema)]
struct ServiceInfo {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

#[derive(Serialize, utoipa::ToSchema)]
struct HealthInfo {
    status: &'static str,
    llm_configured: bool,
    model: String,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct CompareQuery {
    /// Comma-separated tickers, e.g. `RELIANCE,TCS,INFY` (2-5 accepted).
    pub tickers: String,
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service liveness")),
    tag = "Analysis"
)]
async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        status: "healthy",
        service: "AI Financial Analyst",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Detailed health including LLM configuration")),
    tag = "Analysis"
)]
async fn health(State(state): State<AppState>) -> Json<HealthInfo> {
    Json(HealthInfo {
        status: "healthy",
        llm_configured: state.settings.llm_configured(),
        model: state.settings.llm_model.clone(),
    })
}

#[utoipa::path(
    get,
    path = "/quote/{ticker}",
    params(("ticker" = String, Path, description = "Stock ticker symbol, e.g. RELIANCE or TCS.BO")),
    responses(
        (status = 200, description = "Quick quote for display"),
        (status = 400, description = "Invalid ticker format"),
        (status = 404, description = "Quote unavailable for the ticker")
    ),
    tag = "Analysis"
)]
async fn get_quote(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<ApiResponse<QuickQuote>>, ApiError> {
    let symbol = parse_ticker(&ticker)?;
    tracing::info!(ticker = %symbol, "Fetching quote");

    let quote = state
        .pipeline
        .quick_quote(&symbol)
        .await
        .map_err(|err| quote_error(&ticker, err))?;

    Ok(Json(ApiResponse::success(quote)))
}

#[utoipa::path(
    get,
    path = "/analyze/{ticker}",
    params(("ticker" = String, Path, description = "Stock ticker symbol, e.g. RELIANCE or TCS.BO")),
    responses(
        (status = 200, description = "Full multi-agent analysis report"),
        (status = 400, description = "Invalid ticker format"),
        (status = 500, description = "Pipeline failed for the ticker")
    ),
    tag = "Analysis"
)]
async fn analyze_ticker(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<ApiResponse<AnalysisReport>>, ApiError> {
    let symbol = parse_ticker(&ticker)?;
    tracing::info!(ticker = %symbol, "Starting full analysis");

    let report = state.pipeline.run(&symbol).await;
    match report {
        AnalysisReport::Failed { error, .. } => Err(ApiError::Internal(error)),
        success => Ok(Json(ApiResponse::success(success))),
    }
}

#[utoipa::path(
    get,
    path = "/compare",
    params(CompareQuery),
    responses(
        (status = 200, description = "Comparison report; failed tickers are listed separately"),
        (status = 400, description = "Fewer than 2 or more than 5 valid tickers supplied"),
        (status = 502, description = "Every requested ticker failed")
    ),
    tag = "Analysis"
)]
async fn compare_tickers(
    State(state): State<AppState>,
    Query(query): Query<CompareQuery>,
) -> Result<Json<ApiResponse<ComparisonReport>>, ApiError> {
    let symbols = TickerSymbol::parse_list(&query.tickers)
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let report = compare(&state.pipeline, &symbols)
        .await
        .map_err(|err| ApiError::BadGateway(err.to_string()))?;

    Ok(Json(ApiResponse::success(report)))
}

async fn openapi_doc() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn parse_ticker(raw: &str) -> Result<TickerSymbol, ApiError> {
    TickerSymbol::parse(raw).map_err(|err| {
        tracing::warn!(ticker = raw, "Invalid ticker format");
        ApiError::BadRequest(err.to_string())
    })
}

fn quote_error(ticker: &str, err: AnalysisError) -> ApiError {
    match err {
        AnalysisError::NoData(_) | AnalysisError::InsufficientData(_) => ApiError::NotFound(
            format!("Could not fetch quote for {ticker}. Please verify the ticker symbol and try again."),
        ),
        other => ApiError::Internal(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_ticker_maps_to_bad_request() {
        let err = parse_ticker("NOT A TICKER").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert!(parse_ticker("RELIANCE").is_ok());
    }

    #[test]
    fn quote_errors_map_to_statuses() {
        let not_found = quote_error("TCS", AnalysisError::NoData("gone".into()));
        assert!(matches!(not_found, ApiError::NotFound(_)));

        let thin = quote_error("TCS", AnalysisError::InsufficientData("thin".into()));
        assert!(matches!(thin, ApiError::NotFound(_)));

        let internal = quote_error("TCS", AnalysisError::ApiError("oops".into()));
        assert!(matches!(internal, ApiError::Internal(_)));
    }

    #[test]
    fn openapi_document_lists_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/analyze/{ticker}"));
        assert!(paths.iter().any(|p| p.as_str() == "/compare"));
        assert!(paths.iter().any(|p| p.as_str() == "/quote/{ticker}"));
    }
}
