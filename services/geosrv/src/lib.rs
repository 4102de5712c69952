//! Grid geo data service
//!
//! Serves substation positions and line geometry for a network snapshot,
//! and resolves unordered line samples into side-1 to side-2 paths, in bulk
//! through a precalculation pass.

pub mod api;
pub mod app_state;
pub mod config;
pub mod dto;
pub mod error;
pub mod geo_service;
pub mod precalculation;
pub mod routes;

pub use app_state::AppState;
pub use config::GeoSrvConfig;
pub use error::{GeoSrvError, Result};
pub use geo_service::GeoService;
pub use precalculation::{
    FallbackTrigger, PrecalculationConfig, PrecalculationCoordinator, PrecalculationReport,
};
pub use routes::create_routes;
