//! Reusable path shapes
//!
//! A skeleton is the endpoint-relative shape of a resolved line, stored under
//! its (country pair, voltage) key. Lines that share a corridor but carry no
//! samples of their own borrow the shape, projected onto their real endpoints.
//! Skeletons are a fallback, never ground truth.
//!
//! # Frame
//!
//! Offsets are expressed in the chord frame of the canonical endpoint pair
//! (`start` belongs to `country_a`, `end` to `country_b`):
//!
//! - `along`: projection on the start→end chord, as a fraction of chord length
//! - `across`: signed perpendicular offset, as a fraction of chord length
//!
//! Projection is therefore a similarity transform (scale, rotate, translate).

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::country::Country;
use crate::position::Position;
use crate::types::ResolvedLine;

/// Shape key: unordered country pair and nominal voltage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SkeletonKey {
    pub country_a: Country,
    pub country_b: Country,
    pub voltage: u32,
}

impl SkeletonKey {
    /// Canonical key, `country_a <= country_b`
    pub fn new(first: Country, second: Country, voltage: u32) -> Self {
        Self::oriented(first, second, voltage).0
    }

    /// Canonical key for a line from `side1` to `side2`
    ///
    /// The flag is `true` when the line runs from `country_b` to `country_a`,
    /// i.e. its endpoints must be swapped to match the stored frame.
    pub fn oriented(side1: Country, side2: Country, voltage: u32) -> (Self, bool) {
        if side1 <= side2 {
            (
                Self {
                    country_a: side1,
                    country_b: side2,
                    voltage,
                },
                false,
            )
        } else {
            (
                Self {
                    country_a: side2,
                    country_b: side1,
                    voltage,
                },
                true,
            )
        }
    }
}

impl std::fmt::Display for SkeletonKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}@{}kV", self.country_a, self.country_b, self.voltage)
    }
}

/// Point offset in the chord frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    pub along: f64,
    pub across: f64,
}

/// Ordered endpoint-relative shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    offsets: Vec<Offset>,
}

/// Chord vector and squared length, `None` for a degenerate chord
fn chord(start: Position, end: Position) -> Option<(f64, f64, f64)> {
    let dx = end.lat - start.lat;
    let dy = end.lon - start.lon;
    let len2 = dx * dx + dy * dy;
    (len2 > 0.0 && len2.is_finite()).then_some((dx, dy, len2))
}

impl Skeleton {
    /// Build from raw offsets, `None` when empty
    pub fn from_offsets(offsets: Vec<Offset>) -> Option<Self> {
        (!offsets.is_empty()).then_some(Self { offsets })
    }

    /// Derive the shape of `interior` relative to `start` → `end`
    ///
    /// Returns `None` without intermediate points or for a degenerate chord.
    pub fn derive(start: Position, end: Position, interior: &[Position]) -> Option<Self> {
        let (dx, dy, len2) = chord(start, end)?;
        let offsets = interior
            .iter()
            .map(|p| {
                let wx = p.lat - start.lat;
                let wy = p.lon - start.lon;
                Offset {
                    along: (dx * wx + dy * wy) / len2,
                    across: (dx * wy - dy * wx) / len2,
                }
            })
            .collect();
        Self::from_offsets(offsets)
    }

    /// Map the shape onto a new endpoint pair
    ///
    /// Returns `None` for a degenerate chord.
    pub fn project(&self, start: Position, end: Position) -> Option<Vec<Position>> {
        let (dx, dy, _) = chord(start, end)?;
        Some(
            self.offsets
                .iter()
                .map(|o| {
                    Position::new(
                        start.lat + o.along * dx - o.across * dy,
                        start.lon + o.along * dy + o.across * dx,
                    )
                })
                .collect(),
        )
    }

    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Concurrent skeleton memo
///
/// Read-many, write-once-per-key. [`SkeletonCache::put`] is an atomic
/// check-then-insert: the first writer for a key wins and later candidates
/// are discarded.
#[derive(Debug, Default)]
pub struct SkeletonCache {
    entries: DashMap<SkeletonKey, Arc<Skeleton>>,
}

impl SkeletonCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &SkeletonKey) -> Option<Arc<Skeleton>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Insert if absent, returns `true` when the skeleton was stored
    pub fn put(&self, key: SkeletonKey, skeleton: Skeleton) -> bool {
        match self.entries.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::new(skeleton));
                true
            },
        }
    }

    /// Offer the shape of a resolved line under its key
    ///
    /// Only lines with at least one intermediate point qualify. Returns `true`
    /// when the line's shape became the key's skeleton.
    pub fn offer(&self, side1: Country, side2: Country, line: &ResolvedLine) -> bool {
        let (Some(first), Some(last)) = (line.path.first(), line.path.last()) else {
            return false;
        };
        let (key, swapped) = SkeletonKey::oriented(side1, side2, line.voltage);
        let skeleton = if swapped {
            let mut interior = line.interior().to_vec();
            interior.reverse();
            Skeleton::derive(*last, *first, &interior)
        } else {
            Skeleton::derive(*first, *last, line.interior())
        };

        match skeleton {
            Some(skeleton) => self.put(key, skeleton),
            None => false,
        }
    }

    /// Substitute samples for a line without samples of its own
    ///
    /// Projects the key's skeleton onto `side1_position` → `side2_position`,
    /// honouring the canonical orientation of the key.
    pub fn substitute(
        &self,
        side1: Country,
        side2: Country,
        voltage: u32,
        side1_position: Position,
        side2_position: Position,
    ) -> Option<Vec<Position>> {
        let (key, swapped) = SkeletonKey::oriented(side1, side2, voltage);
        let skeleton = self.get(&key)?;
        if swapped {
            skeleton.project(side2_position, side1_position)
        } else {
            skeleton.project(side1_position, side2_position)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
