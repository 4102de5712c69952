//! In-memory topology source

use async_trait::async_trait;
use dashmap::DashMap;
use geo_model::NetworkModel;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::error::{NetworkError, Result};
use crate::traits::NetworkProvider;

/// Network snapshots held in a map
#[derive(Default)]
pub struct MemoryNetworkProvider {
    networks: DashMap<Uuid, NetworkModel>,
    requests: AtomicU64,
}

impl MemoryNetworkProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a snapshot, keyed by its id
    pub fn insert(&self, network: NetworkModel) {
        self.networks.insert(network.id, network);
    }

    pub fn remove(&self, id: &Uuid) -> Option<NetworkModel> {
        self.networks.remove(id).map(|(_, n)| n)
    }

    /// Number of `get_network` calls served
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }
}

impl From<NetworkModel> for MemoryNetworkProvider {
    fn from(network: NetworkModel) -> Self {
        let provider = Self::new();
        provider.insert(network);
        provider
    }
}

#[async_trait]
impl NetworkProvider for MemoryNetworkProvider {
    fn source(&self) -> &'static str {
        "memory"
    }

    async fn get_network(&self, id: Uuid) -> Result<NetworkModel> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.networks
            .get(&id)
            .map(|n| n.clone())
            .ok_or(NetworkError::NotFound(id))
    }
}
