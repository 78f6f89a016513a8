// src/api.rs
//! HTTP surface over the matching core.
//!
//! - `GET  /health`      → "OK"
//! - `POST /consolidate` → drafts[] → consolidated requirement set
//! - `POST /rank`        → {requirements, catalog} → ranked report
//! - `POST /analyze`     → {drafts, catalog} → full analysis report
//! - `GET  /metrics`     → Prometheus text (only when a recorder is attached)
//!
//! Handlers call the synchronous core directly; errors become `{error, kind}`.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use shuttle_axum::axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::catalog::parse_catalog_value;
use crate::config::AppConfig;
use crate::error::MatchError;
use crate::metrics::Metrics;
use crate::ranking::{RankedReport, RankingOrchestrator};
use crate::report::{run_analysis, AnalysisReport};
use crate::requirements::{
    ConsolidatedRequirementSet, ConsolidationEngine, RawDraft, RequirementDraft,
};

#[derive(Clone, Default)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub metrics: Option<Metrics>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Arc::new(config),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

pub fn create_router(state: AppState) -> Router {
    let metrics = state.metrics.clone();

    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/consolidate", post(consolidate_handler))
        .route("/rank", post(rank_handler))
        .route("/analyze", post(analyze_handler))
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    match metrics {
        Some(m) => app.merge(m.router()),
        None => app,
    }
}

/// Alias kept for callers that build the router as `api::router(state)`.
pub fn router(state: AppState) -> Router {
    create_router(state)
}

/* ---- Errors ---- */

#[derive(Debug)]
pub enum ApiError {
    Match(MatchError),
    Catalog(String),
    Internal(String),
}

impl From<MatchError> for ApiError {
    fn from(e: MatchError) -> Self {
        ApiError::Match(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<MatchError>() {
            Ok(m) => ApiError::Match(m),
            Err(other) => ApiError::Internal(format!("{other:#}")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::Match(e) => {
                let status = match e {
                    MatchError::EmptyInput => StatusCode::BAD_REQUEST,
                    _ => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, e.kind(), e.to_string())
            }
            ApiError::Catalog(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_catalog", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
        };
        warn!(target: "api", %status, kind, error = %message, "request rejected");
        (status, Json(json!({ "error": message, "kind": kind }))).into_response()
    }
}

/* ---- Handlers ---- */

fn validate(state: &AppState, raw: Vec<RawDraft>) -> Result<Vec<RequirementDraft>, MatchError> {
    let policy = state.config.consolidation.unknown_fields;
    raw.into_iter()
        .map(|r| RequirementDraft::from_raw(r, policy))
        .collect()
}

async fn consolidate_handler(
    State(state): State<AppState>,
    Json(drafts): Json<Vec<RawDraft>>,
) -> Result<Json<ConsolidatedRequirementSet>, ApiError> {
    let engine = ConsolidationEngine::new(state.config.consolidation.unknown_fields);
    let set = engine.consolidate_raw(drafts)?;
    info!(
        target: "api",
        sources = set.source_documents.len(),
        conflicts = set.conflicts.len(),
        "consolidate served"
    );
    Ok(Json(set))
}

#[derive(Deserialize)]
struct RankReq {
    requirements: ConsolidatedRequirementSet,
    catalog: Value,
}

async fn rank_handler(
    State(state): State<AppState>,
    Json(body): Json<RankReq>,
) -> Result<Json<RankedReport>, ApiError> {
    let load = parse_catalog_value(body.catalog).map_err(|e| ApiError::Catalog(e.to_string()))?;
    let mut report = RankingOrchestrator::new(&body.requirements)
        .parallel(state.config.ranking.parallel)
        .rank(&load.items);
    report.merge_failures(load.rejected);
    Ok(Json(report))
}

#[derive(Deserialize)]
struct AnalyzeReq {
    drafts: Vec<RawDraft>,
    catalog: Value,
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Result<Json<AnalysisReport>, ApiError> {
    let drafts = validate(&state, body.drafts)?;
    let load = parse_catalog_value(body.catalog).map_err(|e| ApiError::Catalog(e.to_string()))?;
    let report = run_analysis(&drafts, &load, state.config.ranking.parallel)?;
    info!(
        target: "api",
        analyzed = report.metadata.analyzed,
        top = report.summary.top.as_ref().map(|t| t.code.as_str()).unwrap_or("-"),
        "analyze served"
    );
    Ok(Json(report))
}
