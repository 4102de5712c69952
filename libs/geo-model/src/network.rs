//! Network topology snapshot
//!
//! Read-only view of a network as returned by the network-model source:
//! substations and the lines connecting them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use crate::country::Country;
use crate::position::Position;

/// Substation as known to the topology source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSubstation {
    pub id: String,
    pub country: Country,
    /// Position known to the topology source, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default)]
    pub voltage_levels: BTreeSet<u32>,
}

/// Line as known to the topology source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkLine {
    pub id: String,
    pub country: Country,
    pub voltage: u32,
    #[serde(default = "default_aerial")]
    pub aerial: bool,
    pub side1_substation_id: String,
    pub side2_substation_id: String,
}

fn default_aerial() -> bool {
    true
}

/// Full topology snapshot of one network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkModel {
    pub id: Uuid,
    #[serde(default)]
    pub substations: Vec<NetworkSubstation>,
    #[serde(default)]
    pub lines: Vec<NetworkLine>,
}

impl NetworkModel {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            substations: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Index substations by id
    pub fn substation_index(&self) -> HashMap<&str, &NetworkSubstation> {
        self.substations
            .iter()
            .map(|s| (s.id.as_str(), s))
            .collect()
    }

    /// Lines with the given nominal voltage
    pub fn lines_at_voltage(&self, voltage: u32) -> impl Iterator<Item = &NetworkLine> {
        self.lines.iter().filter(move |l| l.voltage == voltage)
    }
}
