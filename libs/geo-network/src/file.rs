//! File-based topology source
//!
//! Looks up `{dir}/{id}.json`, then `{id}.yaml`, then `{id}.yml`.

use async_trait::async_trait;
use geo_model::NetworkModel;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::error::{NetworkError, Result};
use crate::traits::NetworkProvider;

const EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// Network snapshots stored as files in one directory
#[derive(Debug, Clone)]
pub struct FileNetworkProvider {
    dir: PathBuf,
}

impl FileNetworkProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn parse(path: &Path, extension: &str, content: &str) -> Result<NetworkModel> {
        let parsed = if extension == "json" {
            serde_json::from_str(content).map_err(NetworkError::from)
        } else {
            serde_yaml::from_str(content).map_err(NetworkError::from)
        };
        parsed.map_err(|e| NetworkError::Parse(format!("{}: {}", path.display(), e)))
    }
}

#[async_trait]
impl NetworkProvider for FileNetworkProvider {
    fn source(&self) -> &'static str {
        "file"
    }

    async fn get_network(&self, id: Uuid) -> Result<NetworkModel> {
        for extension in EXTENSIONS {
            let path = self.dir.join(format!("{}.{}", id, extension));
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            debug!("Loading network {} from {}", id, path.display());
            let network = Self::parse(&path, extension, &content)?;
            if network.id != id {
                return Err(NetworkError::Parse(format!(
                    "{}: declares network {}",
                    path.display(),
                    network.id
                )));
            }
            return Ok(network);
        }

        if !tokio::fs::try_exists(&self.dir).await.unwrap_or(false) {
            return Err(NetworkError::Unavailable(format!(
                "network directory {} does not exist",
                self.dir.display()
            )));
        }
        Err(NetworkError::NotFound(id))
    }
}
