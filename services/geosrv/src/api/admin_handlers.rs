//! Runtime log level control

use axum::response::Json;
use common::SuccessResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::GeoSrvError;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogLevelResponse {
    /// Active filter directive
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetLogLevelRequest {
    /// `EnvFilter` directive, e.g. `debug` or `info,geosrv=trace`
    pub level: String,
}

#[cfg_attr(feature = "swagger-ui", utoipa::path(
    get,
    path = "/admin/log-level",
    tag = "admin",
    responses((status = 200, description = "Current filter", body = LogLevelResponse))
))]
pub async fn get_log_level() -> Json<SuccessResponse<LogLevelResponse>> {
    Json(SuccessResponse::new(LogLevelResponse {
        level: common::logging::get_log_level(),
    }))
}

#[cfg_attr(feature = "swagger-ui", utoipa::path(
    put,
    path = "/admin/log-level",
    tag = "admin",
    request_body = SetLogLevelRequest,
    responses(
        (status = 200, description = "Filter applied", body = LogLevelResponse),
        (status = 400, description = "Invalid directive or logging not initialized")
    )
))]
pub async fn set_log_level(
    Json(request): Json<SetLogLevelRequest>,
) -> Result<Json<SuccessResponse<LogLevelResponse>>, GeoSrvError> {
    common::logging::set_log_level(&request.level).map_err(GeoSrvError::BadRequest)?;
    Ok(Json(SuccessResponse::new(LogLevelResponse {
        level: common::logging::get_log_level(),
    })))
}
