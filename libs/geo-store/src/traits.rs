//! Trait definitions for geo storage

use async_trait::async_trait;
use geo_model::{Position, RawLine, ResolvedLine, Substation};

use crate::error::Result;

/// Geo data storage
///
/// Persists substation positions and line geometry. The precalculation pass
/// only needs the line accessors; the substation and bulk-insert operations
/// serve the ingestion endpoints.
///
/// Implementations:
/// - `MemoryGeoStore`: in-memory backend for tests and embedded use
/// - `SqliteGeoStore`: SQLite backend
///
/// A write followed by a read of the same line id must be consistent.
#[async_trait]
pub trait GeoStore: Send + Sync + 'static {
    /// Backend name for logs and health output
    fn backend(&self) -> &'static str;

    // ========== Substations ==========

    /// Insert or replace substations by id
    async fn save_substations(&self, substations: Vec<Substation>) -> Result<()>;

    async fn get_substation(&self, id: &str) -> Result<Option<Substation>>;

    // ========== Lines ==========

    /// Insert unresolved lines, ignoring ids already present
    ///
    /// Returns the number of inserted lines.
    async fn save_lines(&self, lines: Vec<RawLine>) -> Result<usize>;

    /// Stored samples of a line, empty when the line is unknown
    async fn get_raw_samples(&self, line_id: &str) -> Result<Vec<Position>>;

    /// Resolved geometry, `None` when unknown or not yet resolved
    async fn get_resolved(&self, line_id: &str) -> Result<Option<ResolvedLine>>;

    /// Store an ordered path and mark the line resolved
    async fn put_resolved(&self, line: ResolvedLine) -> Result<()>;

    async fn is_resolved(&self, line_id: &str) -> Result<bool>;

    /// Number of stored lines, resolved or not
    async fn line_count(&self) -> Result<usize>;
}
