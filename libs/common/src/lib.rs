//! Shared building blocks for the geo data services
//!
//! - API response envelopes and the axum error type
//! - logging setup and the HTTP access-log middleware
//! - graceful shutdown signal handling

pub mod api_types;
pub mod logging;
pub mod serde_helpers;
pub mod shutdown;

// Re-export commonly used API types
pub use api_types::{
    ComponentHealth, ErrorInfo, ErrorResponse, HealthStatus, PaginatedResponse, ServiceStatus,
    SuccessResponse,
};

#[cfg(feature = "axum")]
pub use api_types::AppError;
