//! Shared test fixtures

#![allow(dead_code)]
#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use geo_model::{Country, NetworkLine, NetworkModel, NetworkSubstation, Position, RawLine};
use geo_store::{GeoStore, MemoryGeoStore};
use uuid::Uuid;

/// Fluent network snapshot builder
pub struct NetworkBuilder {
    network: NetworkModel,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self {
            network: NetworkModel::new(Uuid::new_v4()),
        }
    }

    pub fn substation(mut self, id: &str, country: Country, position: (f64, f64)) -> Self {
        self.network.substations.push(NetworkSubstation {
            id: id.to_string(),
            country,
            position: Some(Position::from(position)),
            voltage_levels: Default::default(),
        });
        self
    }

    pub fn unplaced_substation(mut self, id: &str, country: Country) -> Self {
        self.network.substations.push(NetworkSubstation {
            id: id.to_string(),
            country,
            position: None,
            voltage_levels: Default::default(),
        });
        self
    }

    pub fn line(mut self, id: &str, voltage: u32, side1: &str, side2: &str) -> Self {
        self.network.lines.push(NetworkLine {
            id: id.to_string(),
            country: Country::FR,
            voltage,
            aerial: true,
            side1_substation_id: side1.to_string(),
            side2_substation_id: side2.to_string(),
        });
        self
    }

    pub fn build(self) -> NetworkModel {
        self.network
    }
}

pub fn points(coords: &[(f64, f64)]) -> Vec<Position> {
    coords.iter().copied().map(Position::from).collect()
}

pub async fn store_samples(store: &MemoryGeoStore, line_id: &str, voltage: u32, samples: &[(f64, f64)]) {
    store
        .save_lines(vec![RawLine::unresolved(
            line_id,
            Country::FR,
            voltage,
            true,
            points(samples),
        )])
        .await
        .unwrap();
}

pub fn assert_close(actual: Position, expected: (f64, f64)) {
    assert!(
        (actual.lat - expected.0).abs() < 1e-9 && (actual.lon - expected.1).abs() < 1e-9,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}
