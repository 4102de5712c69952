//! Shared API models
//!
//! Response envelopes and error mapping used by every HTTP endpoint, so all
//! services answer with the same JSON shape.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

// ============================================================================
// Standard API Response Models
// ============================================================================

/// Standard success response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SuccessResponse<T> {
    /// Always true
    #[serde(default = "crate::serde_helpers::bool_true")]
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Standard error response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ErrorResponse {
    /// Always false
    #[serde(default)]
    pub success: bool,
    pub error: ErrorInfo,
}

/// Error payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ErrorInfo {
    /// HTTP status code
    pub code: u16,
    pub message: String,
    /// Set when a retry may succeed (collaborator outage, timeout)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
}

impl ErrorInfo {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: false,
        }
    }
}

// ============================================================================
// AppError - HTTP Error with proper status codes (requires axum feature)
// ============================================================================

#[cfg(feature = "axum")]
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

/// Application error with HTTP status code
///
/// Implements `IntoResponse`, so handlers can return `Result<_, AppError>`.
#[cfg(feature = "axum")]
#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub error: ErrorInfo,
}

#[cfg(feature = "axum")]
impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            error: ErrorInfo::new(status.as_u16(), message),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 404 Not Found
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 500 Internal Server Error
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// 503 Service Unavailable, retryable
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message).retryable()
    }

    /// 504 Gateway Timeout, retryable
    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, message).retryable()
    }

    pub fn retryable(mut self) -> Self {
        self.error.retryable = true;
        self
    }
}

#[cfg(feature = "axum")]
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                success: false,
                error: self.error,
            }),
        )
            .into_response()
    }
}

// ============================================================================
// Pagination Models
// ============================================================================

/// Upper bound on a requested page size
pub const MAX_PAGE_SIZE: usize = 10_000;

/// One page of a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct PaginatedResponse<T> {
    #[serde(rename = "list", alias = "items")]
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: usize,
    /// Current page (1-indexed)
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> PaginatedResponse<T> {
    /// Cut page `page` (1-indexed) out of the full listing
    ///
    /// `page` is raised to 1 and `page_size` clamped to `1..=MAX_PAGE_SIZE`.
    /// A page past the end yields an empty list with the real totals.
    pub fn from_slice(all_items: Vec<T>, page: usize, page_size: usize) -> Self {
        let total = all_items.len();
        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let total_pages = total.div_ceil(page_size);

        let start = (page - 1).saturating_mul(page_size);
        let items: Vec<T> = if start < total {
            all_items.into_iter().skip(start).take(page_size).collect()
        } else {
            Vec::new()
        };

        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }
}

// ============================================================================
// Service Health Models
// ============================================================================

/// Service health report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct HealthStatus {
    pub status: ServiceStatus,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Per-collaborator checks
    #[serde(default)]
    pub checks: HashMap<String, ComponentHealth>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Health of one component
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ComponentHealth {
    pub status: ServiceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl ComponentHealth {
    pub fn healthy(duration_ms: u64) -> Self {
        Self {
            status: ServiceStatus::Healthy,
            message: None,
            duration_ms: Some(duration_ms),
        }
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: ServiceStatus::Unhealthy,
            message: Some(message.into()),
            duration_ms: None,
        }
    }
}

impl HealthStatus {
    /// Overall status from component checks: any unhealthy check degrades
    pub fn from_checks(
        service: impl Into<String>,
        version: impl Into<String>,
        uptime_seconds: u64,
        checks: HashMap<String, ComponentHealth>,
    ) -> Self {
        let status = if checks
            .values()
            .any(|c| c.status != ServiceStatus::Healthy)
        {
            ServiceStatus::Degraded
        } else {
            ServiceStatus::Healthy
        };
        Self {
            status,
            service: service.into(),
            version: version.into(),
            uptime_seconds,
            timestamp: chrono::Utc::now(),
            checks,
        }
    }
}
