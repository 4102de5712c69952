//! Substation position queries and ingestion

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use common::SuccessResponse;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::dto::{IngestReport, Listing, PaginationQuery, SubstationGeoData};
use crate::error::GeoSrvError;

/// Substations of a network that have a known position
#[cfg_attr(feature = "swagger-ui", utoipa::path(
    get,
    path = "/v1/substations/{network_id}",
    tag = "substations",
    params(("network_id" = Uuid, Path, description = "Network id"), PaginationQuery),
    responses(
        (status = 200, description = "Substation positions", body = Vec<SubstationGeoData>),
        (status = 404, description = "Unknown network")
    )
))]
pub async fn get_substations(
    State(state): State<Arc<AppState>>,
    Path(network_id): Path<Uuid>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<SuccessResponse<Listing<SubstationGeoData>>>, GeoSrvError> {
    let substations = state.geo.substations(network_id).await?;
    Ok(Json(SuccessResponse::new(Listing::from_query(
        substations,
        &query,
    ))))
}

#[cfg_attr(feature = "swagger-ui", utoipa::path(
    post,
    path = "/v1/substations",
    tag = "substations",
    request_body = Vec<crate::dto::SubstationRecord>,
    responses(
        (status = 200, description = "Ingestion report", body = IngestReport),
        (status = 400, description = "Body is not a JSON array")
    )
))]
pub async fn save_substations(
    State(state): State<Arc<AppState>>,
    Json(records): Json<Vec<Value>>,
) -> Result<Json<SuccessResponse<IngestReport>>, GeoSrvError> {
    let report = state.geo.save_substations(records).await?;
    Ok(Json(SuccessResponse::new(report)))
}
