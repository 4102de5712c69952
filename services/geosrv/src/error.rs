//! Service error type and its HTTP mapping

use axum::response::{IntoResponse, Response};
use common::AppError;
use geo_model::ModelError;
use geo_network::NetworkError;
use geo_store::StoreError;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, GeoSrvError>;

#[derive(Error, Debug)]
pub enum GeoSrvError {
    #[error("Network not found: {0}")]
    NetworkNotFound(Uuid),

    #[error("Network source error: {0}")]
    Network(NetworkError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid record: {0}")]
    Model(#[from] ModelError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Precalculation of network {network_id} timed out after {secs}s")]
    Timeout { network_id: Uuid, secs: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GeoSrvError {
    /// Whether the caller may retry the same request later
    pub fn is_retryable(&self) -> bool {
        match self {
            GeoSrvError::Network(err) => err.is_retryable(),
            GeoSrvError::Store(err) => err.is_retryable(),
            GeoSrvError::Timeout { .. } => true,
            _ => false,
        }
    }
}

impl From<NetworkError> for GeoSrvError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::NotFound(id) => GeoSrvError::NetworkNotFound(id),
            other => GeoSrvError::Network(other),
        }
    }
}

impl From<figment::Error> for GeoSrvError {
    fn from(err: figment::Error) -> Self {
        GeoSrvError::Config(err.to_string())
    }
}

impl From<GeoSrvError> for AppError {
    fn from(err: GeoSrvError) -> Self {
        let message = err.to_string();
        match &err {
            GeoSrvError::NetworkNotFound(_) => AppError::not_found(message),
            GeoSrvError::BadRequest(_) | GeoSrvError::Model(_) => AppError::bad_request(message),
            GeoSrvError::Timeout { .. } => AppError::gateway_timeout(message),
            _ if err.is_retryable() => AppError::service_unavailable(message),
            GeoSrvError::Network(_) => AppError::service_unavailable(message),
            GeoSrvError::Config(_) => AppError::internal_error("Configuration error"),
            GeoSrvError::Store(_) | GeoSrvError::Internal(_) => AppError::internal_error(message),
        }
    }
}

impl IntoResponse for GeoSrvError {
    fn into_response(self) -> Response {
        if !matches!(
            self,
            GeoSrvError::NetworkNotFound(_) | GeoSrvError::BadRequest(_) | GeoSrvError::Model(_)
        ) {
            tracing::error!("Request failed: {}", self);
        }
        AppError::from(self).into_response()
    }
}
