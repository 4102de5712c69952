//! Substation and line geo records

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::country::Country;
use crate::position::Position;

/// Grid node with a fixed geographic position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substation {
    pub id: String,
    pub country: Country,
    pub position: Position,
    #[serde(default)]
    pub voltage_levels: BTreeSet<u32>,
}

/// Line geometry as persisted
///
/// `samples` is an unordered bag while `resolved == false` and an ordered
/// path (endpoints included) once resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLine {
    pub id: String,
    pub country: Country,
    pub voltage: u32,
    pub aerial: bool,
    #[serde(default)]
    pub samples: Vec<Position>,
    #[serde(default)]
    pub resolved: bool,
}

impl RawLine {
    /// Create an unresolved line record
    pub fn unresolved(
        id: impl Into<String>,
        country: Country,
        voltage: u32,
        aerial: bool,
        samples: Vec<Position>,
    ) -> Self {
        Self {
            id: id.into(),
            country,
            voltage,
            aerial,
            samples,
            resolved: false,
        }
    }
}

/// Line with an ordered path from side-1 to side-2
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLine {
    pub id: String,
    pub country: Country,
    pub voltage: u32,
    pub aerial: bool,
    /// Ordered path, `path[0]` is side-1 and the last point is side-2
    pub path: Vec<Position>,
}

impl ResolvedLine {
    /// Intermediate points, endpoints excluded
    pub fn interior(&self) -> &[Position] {
        if self.path.len() <= 2 {
            &[]
        } else {
            &self.path[1..self.path.len() - 1]
        }
    }

    /// Persistable form
    pub fn into_raw(self) -> RawLine {
        RawLine {
            id: self.id,
            country: self.country,
            voltage: self.voltage,
            aerial: self.aerial,
            samples: self.path,
            resolved: true,
        }
    }

    /// Rebuild from a stored record, `None` when the record is not resolved
    pub fn from_raw(raw: RawLine) -> Option<Self> {
        raw.resolved.then(|| Self {
            id: raw.id,
            country: raw.country,
            voltage: raw.voltage,
            aerial: raw.aerial,
            path: raw.samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(path: Vec<Position>) -> ResolvedLine {
        ResolvedLine {
            id: "l1".to_string(),
            country: Country::FR,
            voltage: 400,
            aerial: true,
            path,
        }
    }

    #[test]
    fn test_interior_excludes_endpoints() {
        let line = resolved(vec![
            Position::new(0.0, 0.0),
            Position::new(1.0, 1.0),
            Position::new(2.0, 2.0),
        ]);
        assert_eq!(line.interior(), &[Position::new(1.0, 1.0)]);

        let straight = resolved(vec![Position::new(0.0, 0.0), Position::new(2.0, 2.0)]);
        assert!(straight.interior().is_empty());
    }

    #[test]
    fn test_raw_conversion_keeps_resolved_flag() {
        let line = resolved(vec![Position::new(0.0, 0.0), Position::new(2.0, 2.0)]);
        let raw = line.clone().into_raw();
        assert!(raw.resolved);
        assert_eq!(ResolvedLine::from_raw(raw), Some(line));

        let unresolved = RawLine::unresolved("l2", Country::BE, 225, false, vec![]);
        assert_eq!(ResolvedLine::from_raw(unresolved), None);
    }
}
