use axum::{
    extract::{Path, Query, State},
    response::{Json, Redirect},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::alexa::{self, AlexaResponse};
use crate::cache::CacheStats;
use crate::config::Config;
use crate::error::ApiError;
use crate::limits::{ClassStats, FetchLimits};
use crate::locations;
use crate::orchestrator::{Aggregator, ConditionsResponse, DashboardResponse, DebugConditions};
use crate::recommend::Mode;
use crate::timeslot::TimeSlot;

const DEFAULT_BEACH: &str = "barry-island";
const DEFAULT_DASHBOARD_BEACHES: &[&str] = &["rhossili", "barry-island", "tenby-south"];

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub aggregator: Arc<Aggregator>,
    pub limits: Arc<FetchLimits>,
}

#[derive(Debug, Deserialize)]
pub struct ConditionsQuery {
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub beaches: Option<String>,
    pub mode: Option<String>,
    pub time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DebugQuery {
    pub time: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct LocationView {
    pub slug: &'static str,
    pub name: &'static str,
    pub area: &'static str,
    pub facing: &'static str,
    pub region: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CacheClearResponse {
    pub message: &'static str,
    pub entries_removed: u64,
}

fn parse_mode(raw: Option<&str>) -> Result<Mode, ApiError> {
    raw.unwrap_or("swimming")
        .parse()
        .map_err(|_| ApiError::InvalidMode)
}

fn parse_slot(raw: Option<&str>) -> Result<TimeSlot, ApiError> {
    raw.unwrap_or("now").parse().map_err(|_| ApiError::InvalidTime)
}

pub async fn root() -> Redirect {
    Redirect::to("/conditions/barry-island")
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn list_locations() -> Json<Vec<LocationView>> {
    Json(
        locations::all()
            .iter()
            .map(|b| LocationView {
                slug: b.slug,
                name: b.name,
                area: b.area,
                facing: b.facing.as_str(),
                region: b.region,
            })
            .collect(),
    )
}

pub async fn get_default_conditions(
    State(state): State<AppState>,
    Query(params): Query<ConditionsQuery>,
) -> Result<Json<ConditionsResponse>, ApiError> {
    conditions_for(&state, DEFAULT_BEACH, params).await
}

pub async fn get_conditions(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<ConditionsQuery>,
) -> Result<Json<ConditionsResponse>, ApiError> {
    conditions_for(&state, &slug, params).await
}

async fn conditions_for(
    state: &AppState,
    slug: &str,
    params: ConditionsQuery,
) -> Result<Json<ConditionsResponse>, ApiError> {
    let mode = parse_mode(params.mode.as_deref())?;
    let response = state.aggregator.single(slug, mode).await?;
    Ok(Json(response))
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let mode = parse_mode(params.mode.as_deref())?;
    let slot = parse_slot(params.time.as_deref())?;

    let slugs: Vec<String> = match params.beaches.as_deref() {
        Some(list) => list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => DEFAULT_DASHBOARD_BEACHES
            .iter()
            .map(|s| s.to_string())
            .collect(),
    };

    let response = state.aggregator.dashboard(&slugs, mode, slot).await?;
    Ok(Json(response))
}

pub async fn post_alexa(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Json<AlexaResponse> {
    Json(alexa::handle(&state.aggregator, payload).await)
}

pub async fn limits_stats(State(state): State<AppState>) -> Json<Vec<ClassStats>> {
    Json(state.limits.stats())
}

pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.aggregator.cache_stats().await)
}

pub async fn clear_cache(State(state): State<AppState>) -> Json<CacheClearResponse> {
    let entries_removed = state.aggregator.clear_cache().await;
    Json(CacheClearResponse {
        message: "Cache cleared",
        entries_removed,
    })
}

pub async fn debug_conditions(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<DebugQuery>,
) -> Result<Json<DebugConditions>, ApiError> {
    let slot = parse_slot(params.time.as_deref())?;
    let response = state.aggregator.debug(&slug, slot).await?;
    Ok(Json(response))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/locations", get(list_locations))
        .route("/conditions", get(get_default_conditions))
        .route("/conditions/:slug", get(get_conditions))
        .route("/dashboard", get(get_dashboard))
        .route("/alexa", post(post_alexa))
        .route("/limits/stats", get(limits_stats))
        .route("/cache/stats", get(cache_stats))
        .route("/cache/clear", post(clear_cache))
        .route("/debug/conditions/:slug", get(debug_conditions))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode_defaults_to_swimming() {
        assert_eq!(parse_mode(None).unwrap(), Mode::Swimming);
        assert_eq!(parse_mode(Some("dipping")).unwrap(), Mode::Dipping);
    }

    #[test]
    fn test_parse_mode_rejects_unknown() {
        assert_eq!(parse_mode(Some("flying")).unwrap_err(), ApiError::InvalidMode);
    }

    #[test]
    fn test_parse_slot_defaults_to_now() {
        assert_eq!(parse_slot(None).unwrap(), TimeSlot::Now);
        assert_eq!(parse_slot(Some("tonight")).unwrap(), TimeSlot::Tonight);
    }

    #[test]
    fn test_parse_slot_rejects_unknown() {
        assert_eq!(
            parse_slot(Some("yesterday")).unwrap_err(),
            ApiError::InvalidTime
        );
    }
}
