//! Readiness endpoint

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use database::postgres::check_health;
use serde_json::Value;

use crate::state::AppState;

/// `SELECT 1` against the pool; always ready when running in memory
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let mut checks: Vec<(&str, HealthCheckFuture<'_>)> = Vec::new();

    if let Some(db) = &state.db {
        checks.push((
            "database",
            Box::pin(async move { check_health(db).await.map_err(|e| e.to_string()) }),
        ));
    }

    run_health_checks(checks).await
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(ready))
        .with_state(state)
}
