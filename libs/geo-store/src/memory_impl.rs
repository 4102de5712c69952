//! In-memory geo store
//!
//! Uses DashMap for lock-free concurrent access. Perfect for testing and
//! embedded scenarios. Call counters expose how much work a caller did.

use async_trait::async_trait;
use dashmap::DashMap;
use geo_model::{Position, RawLine, ResolvedLine, Substation};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::traits::GeoStore;

/// In-memory geo store with concurrent access support
pub struct MemoryGeoStore {
    substations: Arc<DashMap<String, Substation>>,
    lines: Arc<DashMap<String, RawLine>>,
    counters: Arc<Counters>,
}

#[derive(Default)]
struct Counters {
    raw_sample_reads: AtomicU64,
    resolved_checks: AtomicU64,
    resolved_writes: AtomicU64,
}

impl MemoryGeoStore {
    pub fn new() -> Self {
        Self {
            substations: Arc::new(DashMap::new()),
            lines: Arc::new(DashMap::new()),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Seed a line record as-is (resolved or not), bypassing insert-if-absent
    pub fn insert_line(&self, line: RawLine) {
        self.lines.insert(line.id.clone(), line);
    }

    /// Raw stored record
    pub fn line(&self, id: &str) -> Option<RawLine> {
        self.lines.get(id).map(|l| l.clone())
    }

    /// Clear all data and counters (useful for testing)
    pub fn clear(&self) {
        self.substations.clear();
        self.lines.clear();
        self.reset_stats();
    }

    pub fn reset_stats(&self) {
        self.counters.raw_sample_reads.store(0, Ordering::Relaxed);
        self.counters.resolved_checks.store(0, Ordering::Relaxed);
        self.counters.resolved_writes.store(0, Ordering::Relaxed);
    }

    /// Get statistics about stored data and calls
    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            substation_count: self.substations.len(),
            line_count: self.lines.len(),
            resolved_count: self.lines.iter().filter(|l| l.resolved).count(),
            raw_sample_reads: self.counters.raw_sample_reads.load(Ordering::Relaxed),
            resolved_checks: self.counters.resolved_checks.load(Ordering::Relaxed),
            resolved_writes: self.counters.resolved_writes.load(Ordering::Relaxed),
        }
    }
}

impl Default for MemoryGeoStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about memory store usage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStats {
    pub substation_count: usize,
    pub line_count: usize,
    pub resolved_count: usize,
    pub raw_sample_reads: u64,
    pub resolved_checks: u64,
    pub resolved_writes: u64,
}

#[async_trait]
impl GeoStore for MemoryGeoStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn save_substations(&self, substations: Vec<Substation>) -> Result<()> {
        for substation in substations {
            self.substations.insert(substation.id.clone(), substation);
        }
        Ok(())
    }

    async fn get_substation(&self, id: &str) -> Result<Option<Substation>> {
        Ok(self.substations.get(id).map(|s| s.clone()))
    }

    async fn save_lines(&self, lines: Vec<RawLine>) -> Result<usize> {
        let mut inserted = 0;
        for line in lines {
            let id = line.id.clone();
            if let dashmap::mapref::entry::Entry::Vacant(vacant) = self.lines.entry(id) {
                vacant.insert(RawLine {
                    resolved: false,
                    ..line
                });
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn get_raw_samples(&self, line_id: &str) -> Result<Vec<Position>> {
        self.counters
            .raw_sample_reads
            .fetch_add(1, Ordering::Relaxed);
        Ok(self
            .lines
            .get(line_id)
            .map(|l| l.samples.clone())
            .unwrap_or_default())
    }

    async fn get_resolved(&self, line_id: &str) -> Result<Option<ResolvedLine>> {
        Ok(self
            .lines
            .get(line_id)
            .and_then(|l| ResolvedLine::from_raw(l.clone())))
    }

    async fn put_resolved(&self, line: ResolvedLine) -> Result<()> {
        self.counters
            .resolved_writes
            .fetch_add(1, Ordering::Relaxed);
        self.lines.insert(line.id.clone(), line.into_raw());
        Ok(())
    }

    async fn is_resolved(&self, line_id: &str) -> Result<bool> {
        self.counters
            .resolved_checks
            .fetch_add(1, Ordering::Relaxed);
        Ok(self.lines.get(line_id).is_some_and(|l| l.resolved))
    }

    async fn line_count(&self) -> Result<usize> {
        Ok(self.lines.len())
    }
}
