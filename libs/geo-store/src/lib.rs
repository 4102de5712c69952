//! Geo data storage abstraction
//!
//! Persists substations and line geometry behind the [`GeoStore`] trait,
//! with an in-memory backend and a SQLite backend.
//!
//! # Key Components
//!
//! - **GeoStore trait**: line and substation persistence used by ingestion
//!   and precalculation
//! - **MemoryGeoStore**: DashMap backend with call counters
//! - **SqliteGeoStore**: sqlx backend, enabled by `sqlite-backend`

pub mod error;
pub mod memory_impl;
pub mod traits;

#[cfg(feature = "sqlite-backend")]
pub mod sqlite_impl;

// Re-exports
pub use error::{Result, StoreError};
pub use memory_impl::{MemoryGeoStore, MemoryStats};
pub use traits::GeoStore;

#[cfg(feature = "sqlite-backend")]
pub use sqlite_impl::SqliteGeoStore;

/// Helper functions for common operations
pub mod helpers {
    use super::{GeoStore, MemoryGeoStore};
    use std::sync::Arc;

    // ==================== Test Support ====================

    /// Create an in-memory store for unit testing
    ///
    /// # Example
    /// ```
    /// use geo_store::helpers::create_test_store;
    ///
    /// let store = create_test_store();
    /// assert_eq!(store.backend(), "memory");
    /// ```
    pub fn create_test_store() -> Arc<dyn GeoStore> {
        Arc::new(MemoryGeoStore::new())
    }

    /// Create a concrete MemoryGeoStore for unit testing
    ///
    /// Use this when you need the call counters.
    pub fn create_test_memory_store() -> Arc<MemoryGeoStore> {
        Arc::new(MemoryGeoStore::new())
    }
}
