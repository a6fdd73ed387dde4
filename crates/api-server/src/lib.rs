//! HTTP surface for the multi-agent analysis pipeline.

use analysis_orchestrator::AnalysisPipeline;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use llm_client::{build_narrator, NarratorConfig};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use yahoo_client::{RetryPolicy, YahooClient, YahooClientConfig};

mod config;
mod routes;

pub use config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnalysisPipeline>,
    pub settings: Arc<Settings>,
}

/// Uniform response wrapper for every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Handler error with an HTTP status, rendered as a failure envelope.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    BadGateway(String),
    Internal(String),
}

impl ApiError {
    fn parts(self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::BadGateway(message) => (StatusCode::BAD_GATEWAY, message),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.parts();
        (status, Json(ApiResponse::<()>::failure(message))).into_response()
    }
}

pub fn build_state(settings: Settings) -> AppState {
    let provider = Arc::new(YahooClient::new(YahooClientConfig {
        cache_ttl: settings.cache_ttl,
        cache_capacity: settings.cache_capacity,
        retry: RetryPolicy::with_max_attempts(settings.fetch_max_attempts),
        ..YahooClientConfig::default()
    }));
    let narrator = build_narrator(NarratorConfig {
        api_key: settings.anthropic_api_key.clone(),
        model: settings.llm_model.clone(),
        ..NarratorConfig::default()
    });

    AppState {
        pipeline: Arc::new(AnalysisPipeline::new(provider, narrator)),
        settings: Arc::new(settings),
    }
}

pub fn build_app(state: AppState) -> axum::Router {
    let origins: Vec<HeaderValue> = state
        .settings
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    routes::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env();
    let bind_addr = format!("{}:{}", settings.host, settings.port);
    let state = build_state(settings);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "API server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
