//! Geo Model Library
//!
//! Core geometry model and line ordering logic for the grid geo-data service.
//! This library provides pure business logic without service dependencies.
//!
//! # Modules
//!
//! - `position`: immutable geographic points and the planar distance metric
//! - `country`: ISO 3166-1 alpha-2 country codes
//! - `types`: substations, raw and resolved lines
//! - `network`: topology snapshot returned by the network-model source
//! - `resolver`: nearest-forward-chain ordering of line samples
//! - `skeleton`: reusable country-pair/voltage path shapes
//!
//! # Example
//!
//! ```
//! use geo_model::{resolve, Position};
//!
//! let path = resolve(
//!     Position::new(0.0, 0.0),
//!     Position::new(10.0, 0.0),
//!     &[Position::new(7.0, -1.0), Position::new(3.0, 1.0)],
//! );
//! assert_eq!(path.len(), 4);
//! assert_eq!(path[1], Position::new(3.0, 1.0));
//! ```

pub mod country;
pub mod error;
pub mod network;
pub mod position;
pub mod resolver;
pub mod skeleton;
pub mod types;

// Re-exports for convenience
pub use country::Country;
pub use error::{ModelError, Result};
pub use network::{NetworkLine, NetworkModel, NetworkSubstation};
pub use position::Position;
pub use resolver::resolve;
pub use skeleton::{Offset, Skeleton, SkeletonCache, SkeletonKey};
pub use types::{RawLine, ResolvedLine, Substation};
