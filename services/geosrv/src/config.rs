//! Service configuration
//!
//! Layered with figment: built-in defaults, then the YAML file, then
//! `GEOSRV_`-prefixed environment variables (`__` separates nested keys,
//! e.g. `GEOSRV_API__PORT=8090`).

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GeoSrvError, Result};
use crate::precalculation::PrecalculationConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/geosrv.yaml";
pub const ENV_PREFIX: &str = "GEOSRV_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSection {
    pub name: String,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            name: "geosrv".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8087,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: PathBuf,
    pub enable_file: bool,
    pub enable_json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: PathBuf::from("logs"),
            enable_file: false,
            enable_json: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub sqlite_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            sqlite_path: PathBuf::from("data/geosrv.db"),
        }
    }
}

/// Where network topology snapshots come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum NetworkConfig {
    /// `{dir}/{network_id}.json|.yaml|.yml`
    File { dir: PathBuf },
    /// `GET {base_url}/v1/networks/{network_id}`
    Http {
        base_url: String,
        #[serde(default = "default_http_timeout")]
        timeout_secs: u64,
    },
}

fn default_http_timeout() -> u64 {
    30
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig::File {
            dir: PathBuf::from("data/networks"),
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoSrvConfig {
    pub service: ServiceSection,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub network: NetworkConfig,
    pub precalculation: PrecalculationConfig,
}

impl GeoSrvConfig {
    /// Load from `path` (or [`DEFAULT_CONFIG_PATH`]) and the environment
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        let config: Self = Self::figment(path).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.port == 0 {
            return Err(GeoSrvError::Config("api.port must be non-zero".to_string()));
        }
        if self.precalculation.concurrency == 0 {
            return Err(GeoSrvError::Config(
                "precalculation.concurrency must be at least 1".to_string(),
            ));
        }
        if self.storage.backend == StorageBackend::Sqlite
            && self.storage.sqlite_path.as_os_str().is_empty()
        {
            return Err(GeoSrvError::Config(
                "storage.sqlite_path is required for the sqlite backend".to_string(),
            ));
        }
        if let NetworkConfig::Http { base_url, .. } = &self.network {
            if base_url.trim().is_empty() {
                return Err(GeoSrvError::Config(
                    "network.base_url is required for the http source".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
