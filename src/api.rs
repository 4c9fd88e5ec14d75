use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use crate::chart::ChartService;
use crate::error::ChartError;
use crate::models::{CalculateRequest, CalculateResponse, CitySearchQuery};

/// Message returned for failures the caller cannot fix
const INTERNAL_ERROR_MESSAGE: &str = "Ошибка при расчёте натальной карты";

// ── Shared application state ──────────────────────────────────────────

pub struct AppState {
    pub charts: ChartService,
}

pub type SharedState = Arc<AppState>;

// ── Error handling ────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(String),
}

impl From<ChartError> for ApiError {
    fn from(err: ChartError) -> Self {
        if err.is_validation() {
            ApiError::BadRequest(err.to_string())
        } else {
            tracing::error!("Chart calculation failed: {}", err);
            ApiError::Internal(INTERNAL_ERROR_MESSAGE.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({"error": message}))).into_response()
    }
}

// ── Router ────────────────────────────────────────────────────────────

pub fn api_router() -> Router<SharedState> {
    Router::new()
        .route("/api/cities", get(search_cities))
        .route("/api/calculate", post(calculate_chart))
        .route("/health", get(health_check))
}

async fn health_check() -> &'static str {
    "ok"
}

async fn search_cities(
    State(state): State<SharedState>,
    Query(query): Query<CitySearchQuery>,
) -> impl IntoResponse {
    let search = query.search.unwrap_or_default();
    Json(state.charts.cities().search(&search))
}

async fn calculate_chart(
    State(state): State<SharedState>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let chart = state.charts.calculate(&request, Utc::now()).await?;
    Ok(Json(CalculateResponse {
        success: true,
        data: chart,
    }))
}

// ── Tests ─────────────────────────────────────────────────────────────
