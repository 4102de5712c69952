//! Bulk line resolution trigger

use axum::{
    extract::{Path, State},
    response::Json,
};
use common::SuccessResponse;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::GeoSrvError;
use crate::precalculation::PrecalculationReport;

/// Resolve every line of the network not yet resolved
///
/// Lines written before a timeout or a store failure stay resolved; a
/// repeated call continues from there.
#[cfg_attr(feature = "swagger-ui", utoipa::path(
    post,
    path = "/v1/precalculate-lines/{network_id}",
    tag = "precalculation",
    params(("network_id" = Uuid, Path, description = "Network id")),
    responses(
        (status = 200, description = "Pass report", body = PrecalculationReport),
        (status = 404, description = "Unknown network"),
        (status = 503, description = "Collaborator unavailable, retry later"),
        (status = 504, description = "Pass exceeded the configured timeout")
    )
))]
pub async fn precalculate_lines(
    State(state): State<Arc<AppState>>,
    Path(network_id): Path<Uuid>,
) -> Result<Json<SuccessResponse<PrecalculationReport>>, GeoSrvError> {
    let pass = state.precalculation.precalculate(network_id);
    let report = match state.precalculation_timeout() {
        Some(limit) => tokio::time::timeout(limit, pass).await.map_err(|_| {
            warn!(
                "Precalculation of network {} exceeded {}s",
                network_id,
                limit.as_secs()
            );
            GeoSrvError::Timeout {
                network_id,
                secs: limit.as_secs(),
            }
        })??,
        None => pass.await?,
    };
    Ok(Json(SuccessResponse::new(report)))
}
