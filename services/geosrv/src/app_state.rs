//! Application state shared by all handlers

use geo_network::{FileNetworkProvider, HttpNetworkProvider, NetworkProvider};
use geo_store::{GeoStore, MemoryGeoStore, SqliteGeoStore};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use crate::config::{GeoSrvConfig, NetworkConfig, StorageBackend};
use crate::error::{GeoSrvError, Result};
use crate::geo_service::GeoService;
use crate::precalculation::PrecalculationCoordinator;

pub struct AppState {
    pub config: Arc<GeoSrvConfig>,
    pub geo: Arc<GeoService>,
    pub precalculation: Arc<PrecalculationCoordinator>,
    pub started_at: Instant,
}

impl AppState {
    /// Wire the services over already-built collaborators
    pub fn new(
        config: GeoSrvConfig,
        store: Arc<dyn GeoStore>,
        network: Arc<dyn NetworkProvider>,
    ) -> Self {
        let precalculation = PrecalculationCoordinator::new(
            Arc::clone(&store),
            Arc::clone(&network),
            config.precalculation.clone(),
        );
        Self {
            config: Arc::new(config),
            geo: Arc::new(GeoService::new(store, network)),
            precalculation: Arc::new(precalculation),
            started_at: Instant::now(),
        }
    }

    /// Build the store and network source named by the configuration
    pub async fn from_config(config: GeoSrvConfig) -> Result<Self> {
        let store = open_store(&config).await?;
        let network = open_network(&config)?;
        info!(
            "Geo store: {}, network source: {}",
            store.backend(),
            network.source()
        );
        Ok(Self::new(config, store, network))
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// HTTP precalculation bound, `None` when disabled
    pub fn precalculation_timeout(&self) -> Option<Duration> {
        match self.config.precalculation.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

pub async fn open_store(config: &GeoSrvConfig) -> Result<Arc<dyn GeoStore>> {
    let store: Arc<dyn GeoStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryGeoStore::new()),
        StorageBackend::Sqlite => {
            Arc::new(SqliteGeoStore::connect(&config.storage.sqlite_path).await?)
        },
    };
    Ok(store)
}

pub fn open_network(config: &GeoSrvConfig) -> Result<Arc<dyn NetworkProvider>> {
    let network: Arc<dyn NetworkProvider> = match &config.network {
        NetworkConfig::File { dir } => Arc::new(FileNetworkProvider::new(dir.clone())),
        NetworkConfig::Http {
            base_url,
            timeout_secs,
        } => Arc::new(
            HttpNetworkProvider::new(base_url.clone(), Duration::from_secs(*timeout_secs))
                .map_err(|e| GeoSrvError::Config(format!("network client: {}", e)))?,
        ),
    };
    Ok(network)
}
