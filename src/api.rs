use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::error::StoreError;
use crate::service::{FeaturedPage, PeriodInfo, TrendingPage, TrendingService};
use crate::store::{Category, Project, ProjectStatus};
use crate::trending::Period;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TrendingService>,
}

impl AppState {
    pub fn new(service: TrendingService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/periods", get(periods))
        .route("/trending", get(trending))
        .route("/featured", get(featured))
        .route("/categories", get(categories))
        .route("/projects/{id}/upvote", post(upvote).delete(retract_upvote))
        .route("/projects/{id}/comments", post(comment))
        .route("/admin/projects/{id}/status", post(admin_set_status))
        .route("/admin/categories/invalidate", post(admin_invalidate_categories))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => ApiError::NotFound(e.to_string()),
            StoreError::UnknownStatus(_) => ApiError::BadRequest(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        warn!(target: "api", status = status.as_u16(), error = %msg, "request failed");
        (status, Json(json!({ "error": msg }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct TrendingQuery {
    #[serde(default)]
    period: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct FeaturedQuery {
    #[serde(default)]
    count: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct StatusReq {
    status: String,
}

async fn periods(State(state): State<AppState>) -> Json<Vec<PeriodInfo>> {
    Json(state.service.periods())
}

async fn trending(
    State(state): State<AppState>,
    Query(q): Query<TrendingQuery>,
) -> Result<Json<TrendingPage>, ApiError> {
    // Empty `?period=` falls back to the configured default.
    let period = match q.period.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<Period>()
                .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        ),
    };
    Ok(Json(state.service.trending(period, q.limit)))
}

async fn featured(
    State(state): State<AppState>,
    Query(q): Query<FeaturedQuery>,
) -> Json<FeaturedPage> {
    Json(state.service.featured(q.count))
}

async fn categories(State(state): State<AppState>) -> impl IntoResponse {
    let (cats, status): (Vec<Category>, _) = state.service.categories();
    ([("x-cache", status.as_str())], Json(cats))
}

async fn upvote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    Ok(Json(state.service.upvote(&id)?))
}

async fn retract_upvote(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    Ok(Json(state.service.retract_upvote(&id)?))
}

async fn comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    Ok(Json(state.service.comment(&id)?))
}

async fn admin_set_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusReq>,
) -> Result<Json<Project>, ApiError> {
    let status: ProjectStatus = body.status.parse()?;
    info!(target: "api", %id, ?status, "moderation request");
    Ok(Json(state.service.moderate(&id, status)?))
}

async fn admin_invalidate_categories(State(state): State<AppState>) -> &'static str {
    state.service.invalidate_categories();
    "invalidated"
}
