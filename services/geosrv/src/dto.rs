//! Request and response payloads of the HTTP API

use common::PaginatedResponse;
use geo_model::{Country, ModelError, Position, RawLine, ResolvedLine, Substation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utoipa::{IntoParams, ToSchema};

/// Substation with its geographic position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubstationGeoData {
    pub id: String,
    #[schema(value_type = String, example = "FR")]
    pub country: Country,
    pub coordinate: Position,
}

/// Line with its coordinates, side-1 first once ordered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LineGeoData {
    pub id: String,
    #[schema(value_type = String, example = "FR")]
    pub country: Country,
    pub voltage: u32,
    pub aerial: bool,
    pub coordinates: Vec<Position>,
}

impl From<ResolvedLine> for LineGeoData {
    fn from(line: ResolvedLine) -> Self {
        Self {
            id: line.id,
            country: line.country,
            voltage: line.voltage,
            aerial: line.aerial,
            coordinates: line.path,
        }
    }
}

/// Full listing or one page of it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    All(Vec<T>),
    Page(PaginatedResponse<T>),
}

impl<T> Listing<T> {
    pub fn from_query(items: Vec<T>, query: &PaginationQuery) -> Self {
        if query.pagination {
            Listing::Page(PaginatedResponse::from_slice(items, query.page, query.size))
        } else {
            Listing::All(items)
        }
    }
}

/// `?pagination=true&page=1&size=100`; without `pagination` everything is
/// returned
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationQuery {
    /// Enable paging
    #[serde(
        default,
        deserialize_with = "common::serde_helpers::deserialize_bool_flexible"
    )]
    pub pagination: bool,
    /// 1-indexed page number (default 1)
    #[serde(default = "common::serde_helpers::first_page")]
    pub page: usize,
    /// Page size (default 100)
    #[serde(default = "common::serde_helpers::page_size")]
    pub size: usize,
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            pagination: false,
            page: common::serde_helpers::first_page(),
            size: common::serde_helpers::page_size(),
        }
    }
}

// ============================================================================
// Ingestion records
// ============================================================================

/// Substation record accepted by `POST /v1/substations`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubstationRecord {
    pub id: String,
    #[schema(example = "FR")]
    pub country: String,
    pub coordinate: Position,
    #[serde(default)]
    pub voltage_levels: BTreeSet<u32>,
}

impl TryFrom<SubstationRecord> for Substation {
    type Error = ModelError;

    fn try_from(record: SubstationRecord) -> Result<Self, Self::Error> {
        let id = validate_id(record.id)?;
        let country = record.country.parse::<Country>()?;
        let coordinate = Position::try_new(record.coordinate.lat, record.coordinate.lon)?;
        Ok(Substation {
            id,
            country,
            position: coordinate,
            voltage_levels: record.voltage_levels,
        })
    }
}

/// Line record accepted by `POST /v1/lines`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LineRecord {
    pub id: String,
    #[schema(example = "FR")]
    pub country: String,
    pub voltage: i64,
    #[serde(default = "common::serde_helpers::bool_true")]
    pub aerial: bool,
    /// Unordered samples
    #[serde(default)]
    pub coordinates: Vec<Position>,
}

impl TryFrom<LineRecord> for RawLine {
    type Error = ModelError;

    fn try_from(record: LineRecord) -> Result<Self, Self::Error> {
        let id = validate_id(record.id)?;
        let country = record.country.parse::<Country>()?;
        let voltage = u32::try_from(record.voltage)
            .ok()
            .filter(|v| *v > 0)
            .ok_or(ModelError::InvalidVoltage(record.voltage))?;
        let samples = record
            .coordinates
            .into_iter()
            .map(|p| Position::try_new(p.lat, p.lon))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RawLine::unresolved(id, country, voltage, record.aerial, samples))
    }
}

fn validate_id(id: String) -> Result<String, ModelError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(ModelError::invalid_record(id, "empty id"));
    }
    Ok(trimmed.to_string())
}

/// Record that could not be stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RejectedRecord {
    /// Position in the submitted array
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub reason: String,
}

/// Outcome of a bulk upload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IngestReport {
    pub received: usize,
    pub stored: usize,
    /// Valid lines whose id was already present
    #[serde(default)]
    pub ignored_existing: usize,
    #[serde(default)]
    pub rejected: Vec<RejectedRecord>,
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn line_record(json: serde_json::Value) -> Result<RawLine, ModelError> {
        RawLine::try_from(serde_json::from_value::<LineRecord>(json).unwrap())
    }

    #[test]
    fn test_line_record_defaults() {
        let line = line_record(serde_json::json!({
            "id": " l1 ",
            "country": "be",
            "voltage": 220
        }))
        .unwrap();
        assert_eq!(line.id, "l1");
        assert_eq!(line.country, Country::BE);
        assert!(line.aerial);
        assert!(line.samples.is_empty());
        assert!(!line.resolved);
    }

    #[test]
    fn test_line_record_rejects_voltage() {
        for voltage in [0, -400, i64::from(u32::MAX) + 1] {
            let err = line_record(serde_json::json!({
                "id": "l1", "country": "FR", "voltage": voltage
            }))
            .unwrap_err();
            assert_eq!(err, ModelError::InvalidVoltage(voltage));
        }
    }

    #[test]
    fn test_line_record_rejects_country_and_id() {
        assert!(matches!(
            line_record(serde_json::json!({"id": "l1", "country": "XX", "voltage": 400})),
            Err(ModelError::InvalidCountry(_))
        ));
        assert!(matches!(
            line_record(serde_json::json!({"id": "  ", "country": "FR", "voltage": 400})),
            Err(ModelError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_substation_record() {
        let record: SubstationRecord = serde_json::from_value(serde_json::json!({
            "id": "s1",
            "country": "DE",
            "coordinate": {"lat": 52.5, "lon": 13.4},
            "voltage_levels": [380, 220]
        }))
        .unwrap();
        let substation = Substation::try_from(record).unwrap();
        assert_eq!(substation.position, Position::new(52.5, 13.4));
        assert_eq!(substation.voltage_levels.len(), 2);
    }

    #[test]
    fn test_listing_shapes() {
        let all = Listing::from_query(vec![1, 2, 3], &PaginationQuery::default());
        assert_eq!(serde_json::to_value(&all).unwrap(), serde_json::json!([1, 2, 3]));

        let query = PaginationQuery {
            pagination: true,
            page: 2,
            size: 2,
        };
        let page = serde_json::to_value(Listing::from_query(vec![1, 2, 3], &query)).unwrap();
        assert_eq!(page["list"], serde_json::json!([3]));
        assert_eq!(page["total"], 3);
    }
}
