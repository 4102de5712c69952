//! Health check

use axum::{extract::State, response::Json};
use common::{ComponentHealth, HealthStatus, SuccessResponse};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::app_state::AppState;

/// Service health with a store probe
///
/// A failing store degrades the status instead of failing the request.
#[cfg_attr(feature = "swagger-ui", utoipa::path(
    get,
    path = "/health",
    tag = "geosrv",
    responses(
        (status = 200, description = "Service health", body = HealthStatus)
    )
))]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<SuccessResponse<HealthStatus>> {
    let mut checks = HashMap::new();

    let started = Instant::now();
    let store = state.geo.store();
    let store_health = match store.line_count().await {
        Ok(_) => ComponentHealth::healthy(started.elapsed().as_millis() as u64),
        Err(e) => ComponentHealth::unhealthy(e.to_string()),
    };
    checks.insert(format!("store:{}", store.backend()), store_health);

    let health = HealthStatus::from_checks(
        state.config.service.name.clone(),
        env!("CARGO_PKG_VERSION"),
        state.uptime_seconds(),
        checks,
    );
    Json(SuccessResponse::new(health).with_metadata(
        "network_source",
        serde_json::Value::from(state.geo.network().source()),
    ))
}
