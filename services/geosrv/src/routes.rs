//! API route configuration

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

#[cfg(feature = "swagger-ui")]
use utoipa::OpenApi;

use crate::api::admin_handlers::{get_log_level, set_log_level};
use crate::api::health_handlers::health_check;
use crate::api::line_handlers::{
    get_known_lines, get_known_lines_by_voltage, get_lines, get_lines_by_voltage, save_lines,
};
use crate::api::precalculation_handlers::precalculate_lines;
use crate::api::substation_handlers::{get_substations, save_substations};
use crate::app_state::AppState;

// OpenAPI documentation - only compiled when swagger-ui feature is enabled
#[cfg(feature = "swagger-ui")]
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::health_handlers::health_check,
        crate::api::line_handlers::get_lines,
        crate::api::line_handlers::get_lines_by_voltage,
        crate::api::line_handlers::get_known_lines,
        crate::api::line_handlers::get_known_lines_by_voltage,
        crate::api::line_handlers::save_lines,
        crate::api::substation_handlers::get_substations,
        crate::api::substation_handlers::save_substations,
        crate::api::precalculation_handlers::precalculate_lines,
        crate::api::admin_handlers::get_log_level,
        crate::api::admin_handlers::set_log_level
    ),
    components(
        schemas(
            crate::dto::LineGeoData,
            crate::dto::SubstationGeoData,
            crate::dto::LineRecord,
            crate::dto::SubstationRecord,
            crate::dto::IngestReport,
            crate::dto::RejectedRecord,
            crate::precalculation::PrecalculationReport,
            crate::api::admin_handlers::LogLevelResponse,
            crate::api::admin_handlers::SetLogLevelRequest,
            common::HealthStatus,
            common::ComponentHealth,
            common::ServiceStatus,
            geo_model::Position
        )
    ),
    tags(
        (name = "geosrv", description = "Grid geo data service"),
        (name = "lines", description = "Line geometry"),
        (name = "substations", description = "Substation positions"),
        (name = "precalculation", description = "Bulk line resolution"),
        (name = "admin", description = "Runtime administration")
    )
)]
pub struct GeoSrvApiDoc;

/// Create all API routes for the geo service
pub fn create_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Lines
        .route("/v1/lines", post(save_lines))
        .route("/v1/lines/{network_id}", get(get_lines))
        .route("/v1/lines/{network_id}/{voltage}", get(get_lines_by_voltage))
        .route("/v1/lines-basic/{network_id}", get(get_known_lines))
        .route(
            "/v1/lines-basic/{network_id}/{voltage}",
            get(get_known_lines_by_voltage),
        )
        // Substations
        .route("/v1/substations", post(save_substations))
        .route("/v1/substations/{network_id}", get(get_substations))
        // Precalculation
        .route(
            "/v1/precalculate-lines/{network_id}",
            get(precalculate_lines).post(precalculate_lines),
        )
        // Admin
        .route("/admin/log-level", get(get_log_level).put(set_log_level))
        // Apply HTTP request logging middleware
        .layer(axum::middleware::from_fn(common::logging::http_request_logger))
        .with_state(state)
}
