//! Network topology sources
//!
//! The geo data service does not own the grid topology. It asks a
//! [`NetworkProvider`] for a [`geo_model::NetworkModel`] snapshot by id.
//!
//! # Backends
//!
//! - **MemoryNetworkProvider**: in-process map, for tests and embedding
//! - **FileNetworkProvider**: `{dir}/{id}.json|.yaml|.yml` snapshots
//! - **HttpNetworkProvider**: `GET {base_url}/v1/networks/{id}`

pub mod error;
pub mod file;
pub mod http;
pub mod memory;
pub mod traits;

pub use error::{NetworkError, Result};
pub use file::FileNetworkProvider;
pub use http::HttpNetworkProvider;
pub use memory::MemoryNetworkProvider;
pub use traits::NetworkProvider;
