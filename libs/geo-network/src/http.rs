//! HTTP topology source
//!
//! Fetches `GET {base_url}/v1/networks/{id}` and expects a JSON
//! [`NetworkModel`] body, either bare or wrapped in a `{"data": ...}`
//! success envelope.

use async_trait::async_trait;
use geo_model::NetworkModel;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::error::{NetworkError, Result};
use crate::traits::NetworkProvider;

/// Remote network-model service client
#[derive(Debug, Clone)]
pub struct HttpNetworkProvider {
    base_url: String,
    client: Client,
}

impl HttpNetworkProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn network_url(&self, id: Uuid) -> String {
        format!("{}/v1/networks/{}", self.base_url, id)
    }
}

#[async_trait]
impl NetworkProvider for HttpNetworkProvider {
    fn source(&self) -> &'static str {
        "http"
    }

    async fn get_network(&self, id: Uuid) -> Result<NetworkModel> {
        let url = self.network_url(id);
        debug!("Fetching network {} from {}", id, url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                NetworkError::Unavailable(format!("{}: {}", url, e))
            } else {
                NetworkError::Http(e)
            }
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(NetworkError::NotFound(id)),
            status if status.is_server_error() => {
                return Err(NetworkError::Unavailable(format!(
                    "{} returned {}",
                    url, status
                )))
            },
            status if !status.is_success() => {
                return Err(NetworkError::Parse(format!("{} returned {}", url, status)))
            },
            _ => {},
        }

        let mut body: Value = response.json().await?;
        if let Some(data) = body.get_mut("data") {
            body = data.take();
        }
        Ok(serde_json::from_value(body)?)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_network_url_trims_slash() {
        let provider =
            HttpNetworkProvider::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            provider.network_url(Uuid::nil()),
            "http://localhost:8080/v1/networks/00000000-0000-0000-0000-000000000000"
        );
    }
}
