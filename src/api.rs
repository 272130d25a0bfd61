//! HTTP API for the Subsidy Engine.
//!
//! This module exposes a minimal REST API around the estimation engine
//! using the [`axum`](https://crates.io/crates/axum) framework.  Clients
//! submit one or more work orders and receive calculation results in
//! JSON.  The rate schedules are loaded once at start-up and shared
//! read-only between requests.

use crate::config::AppConfig;
use crate::engine::{run_batch, run_estimate};
use crate::models::{CalculationResult, WorkOrder};
use crate::rates::{load_rate_schedules_from_dir, RateScheduleError, ScheduleRegistry};
use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Application state shared across requests.
pub struct AppState {
    pub registry: ScheduleRegistry,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Schedule(#[from] RateScheduleError),
    #[error("batch estimate failed: {0}")]
    Batch(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Schedule(RateScheduleError::UnknownEdition(_)) => StatusCode::NOT_FOUND,
            ApiError::Schedule(_) | ApiError::Batch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Optional `?edition=` selector.
#[derive(Debug, Default, Deserialize)]
pub struct EditionQuery {
    pub edition: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleListing {
    pub default: String,
    pub editions: Vec<String>,
}

/// Build the schedule registry: the bundled edition plus every valid
/// edition found in the configured directory.
pub fn build_registry(config: &AppConfig) -> Result<ScheduleRegistry, RateScheduleError> {
    let mut registry = ScheduleRegistry::with_bundled()?;
    for schedule in load_rate_schedules_from_dir(&config.schedule_dir)? {
        registry.register(schedule);
    }
    if let Some(edition) = &config.default_edition {
        registry.set_default(edition)?;
    }
    Ok(registry)
}

/// Build the API router over the given schedules.
pub fn build_router(registry: ScheduleRegistry) -> Router {
    let state = Arc::new(AppState { registry });
    Router::new()
        .route("/api/estimate", post(estimate_handler))
        .route("/api/estimate/batch", post(batch_handler))
        .route("/api/schedules", get(schedules_handler))
        .with_state(state)
}

/// Handler for POST /api/estimate
async fn estimate_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<EditionQuery>,
    Json(order): Json<WorkOrder>,
) -> Result<Json<CalculationResult>, ApiError> {
    let schedule = app_state.registry.get(query.edition.as_deref())?;
    Ok(Json(run_estimate(&order, &schedule)))
}

/// Handler for POST /api/estimate/batch
async fn batch_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<EditionQuery>,
    Json(orders): Json<Vec<WorkOrder>>,
) -> Result<Json<Vec<CalculationResult>>, ApiError> {
    let schedule = app_state.registry.get(query.edition.as_deref())?;
    let results = tokio::task::spawn_blocking(move || run_batch(&orders, &schedule)).await?;
    Ok(Json(results))
}

/// Handler for GET /api/schedules
async fn schedules_handler(State(app_state): State<Arc<AppState>>) -> Json<ScheduleListing> {
    Json(ScheduleListing {
        default: app_state.registry.default_edition().to_string(),
        editions: app_state.registry.editions(),
    })
}

/// Launch the API server.  Loads the rate schedules, binds to the
/// configured address and runs until the server terminates.
pub async fn serve(config: &AppConfig) -> Result<()> {
    let registry = build_registry(config)?;
    info!(
        default_edition = registry.default_edition(),
        editions = ?registry.editions(),
        "rate schedules ready"
    );
    let router = build_router(registry);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "server listening");
    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::BUNDLED_EDITION;
    use std::path::Path;

    fn config(schedule_dir: &Path, default_edition: Option<&str>) -> AppConfig {
        AppConfig {
            schedule_dir: schedule_dir.to_path_buf(),
            default_edition: default_edition.map(str::to_string),
            bind_addr: "127.0.0.1:0".parse().expect("valid addr"),
            log_level: "info".into(),
        }
    }

    #[test]
    fn default_edition_must_be_loaded() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = build_registry(&config(dir.path(), Some("1999-01")))
            .expect_err("unloaded edition rejected");
        assert!(matches!(err, RateScheduleError::UnknownEdition(edition) if edition == "1999-01"));
    }

    #[test]
    fn default_edition_may_come_from_the_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut next: serde_json::Value =
            serde_json::to_value(crate::rates::RateSchedule::bundled().expect("bundled"))
                .expect("serialises");
        next["edition"] = json!("2026-01");
        std::fs::write(dir.path().join("2026-01.json"), next.to_string()).expect("write edition");

        let registry = build_registry(&config(dir.path(), Some("2026-01"))).expect("registry");
        assert_eq!(registry.default_edition(), "2026-01");
        assert_eq!(registry.editions(), vec![BUNDLED_EDITION.to_string(), "2026-01".to_string()]);
    }
}
