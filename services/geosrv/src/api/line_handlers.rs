//! Line geometry queries and ingestion

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use common::SuccessResponse;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::dto::{IngestReport, LineGeoData, Listing, PaginationQuery};
use crate::error::GeoSrvError;

/// All lines of a network
///
/// Resolved lines come from the store; others are ordered on the fly.
/// Lines with an unlocated side substation are omitted.
#[cfg_attr(feature = "swagger-ui", utoipa::path(
    get,
    path = "/v1/lines/{network_id}",
    tag = "lines",
    params(("network_id" = Uuid, Path, description = "Network id"), PaginationQuery),
    responses(
        (status = 200, description = "Line geometry", body = Vec<LineGeoData>),
        (status = 404, description = "Unknown network"),
        (status = 503, description = "Network source unavailable")
    )
))]
pub async fn get_lines(
    State(state): State<Arc<AppState>>,
    Path(network_id): Path<Uuid>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<SuccessResponse<Listing<LineGeoData>>>, GeoSrvError> {
    let lines = state.geo.lines(network_id, None).await?;
    Ok(Json(SuccessResponse::new(Listing::from_query(lines, &query))))
}

/// Lines of a network at one nominal voltage
#[cfg_attr(feature = "swagger-ui", utoipa::path(
    get,
    path = "/v1/lines/{network_id}/{voltage}",
    tag = "lines",
    params(
        ("network_id" = Uuid, Path, description = "Network id"),
        ("voltage" = u32, Path, description = "Nominal voltage in kV")
    ),
    responses(
        (status = 200, description = "Line geometry", body = Vec<LineGeoData>),
        (status = 404, description = "Unknown network")
    )
))]
pub async fn get_lines_by_voltage(
    State(state): State<Arc<AppState>>,
    Path((network_id, voltage)): Path<(Uuid, u32)>,
) -> Result<Json<SuccessResponse<Vec<LineGeoData>>>, GeoSrvError> {
    let lines = state.geo.lines(network_id, Some(voltage)).await?;
    Ok(Json(SuccessResponse::new(lines)))
}

/// Lines already resolved in the store
#[cfg_attr(feature = "swagger-ui", utoipa::path(
    get,
    path = "/v1/lines-basic/{network_id}",
    tag = "lines",
    params(("network_id" = Uuid, Path, description = "Network id")),
    responses(
        (status = 200, description = "Resolved lines", body = Vec<LineGeoData>),
        (status = 404, description = "Unknown network")
    )
))]
pub async fn get_known_lines(
    State(state): State<Arc<AppState>>,
    Path(network_id): Path<Uuid>,
) -> Result<Json<SuccessResponse<Vec<LineGeoData>>>, GeoSrvError> {
    let lines = state.geo.known_lines(network_id, None).await?;
    Ok(Json(SuccessResponse::new(lines)))
}

/// Resolved lines at one nominal voltage
#[cfg_attr(feature = "swagger-ui", utoipa::path(
    get,
    path = "/v1/lines-basic/{network_id}/{voltage}",
    tag = "lines",
    params(
        ("network_id" = Uuid, Path, description = "Network id"),
        ("voltage" = u32, Path, description = "Nominal voltage in kV")
    ),
    responses(
        (status = 200, description = "Resolved lines", body = Vec<LineGeoData>),
        (status = 404, description = "Unknown network")
    )
))]
pub async fn get_known_lines_by_voltage(
    State(state): State<Arc<AppState>>,
    Path((network_id, voltage)): Path<(Uuid, u32)>,
) -> Result<Json<SuccessResponse<Vec<LineGeoData>>>, GeoSrvError> {
    let lines = state.geo.known_lines(network_id, Some(voltage)).await?;
    Ok(Json(SuccessResponse::new(lines)))
}

/// Insert lines with unordered samples
///
/// Ids already stored are ignored. Invalid records are listed in the report
/// and the rest of the batch is stored.
#[cfg_attr(feature = "swagger-ui", utoipa::path(
    post,
    path = "/v1/lines",
    tag = "lines",
    request_body = Vec<crate::dto::LineRecord>,
    responses(
        (status = 200, description = "Ingestion report", body = IngestReport),
        (status = 400, description = "Body is not a JSON array")
    )
))]
pub async fn save_lines(
    State(state): State<Arc<AppState>>,
    Json(records): Json<Vec<Value>>,
) -> Result<Json<SuccessResponse<IngestReport>>, GeoSrvError> {
    let report = state.geo.save_lines(records).await?;
    Ok(Json(SuccessResponse::new(report)))
}
