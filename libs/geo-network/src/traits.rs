//! Trait definitions for topology sources

use async_trait::async_trait;
use geo_model::NetworkModel;
use uuid::Uuid;

use crate::error::Result;

/// Source of network topology snapshots
///
/// Returns [`crate::NetworkError::NotFound`] for an unknown id. Other errors
/// mean the source could not be reached or returned garbage.
#[async_trait]
pub trait NetworkProvider: Send + Sync + 'static {
    /// Source name for logs and health output
    fn source(&self) -> &'static str;

    async fn get_network(&self, id: Uuid) -> Result<NetworkModel>;
}
