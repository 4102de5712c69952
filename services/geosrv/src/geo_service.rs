//! Read and ingestion operations behind the HTTP API

use futures::future::{BoxFuture, FutureExt};
use futures::{stream, StreamExt, TryStreamExt};
use geo_model::{resolve, NetworkLine, NetworkModel, NetworkSubstation, RawLine, Substation};
use geo_network::NetworkProvider;
use geo_store::GeoStore;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::dto::{
    IngestReport, LineGeoData, LineRecord, RejectedRecord, SubstationGeoData, SubstationRecord,
};
use crate::error::Result;
use crate::precalculation::locate_endpoint;

/// Parallel store lookups per listing request
const LOOKUP_CONCURRENCY: usize = 16;

/// Geo queries over one store and one network source
pub struct GeoService {
    store: Arc<dyn GeoStore>,
    network: Arc<dyn NetworkProvider>,
}

impl GeoService {
    pub fn new(store: Arc<dyn GeoStore>, network: Arc<dyn NetworkProvider>) -> Self {
        Self { store, network }
    }

    pub fn store(&self) -> &Arc<dyn GeoStore> {
        &self.store
    }

    pub fn network(&self) -> &Arc<dyn NetworkProvider> {
        &self.network
    }

    /// Network substations with a known position
    pub async fn substations(&self, network_id: Uuid) -> Result<Vec<SubstationGeoData>> {
        let network = self.network.get_network(network_id).await?;
        let index = network.substation_index();

        let tasks: Vec<BoxFuture<'_, geo_store::Result<Option<SubstationGeoData>>>> = network
            .substations
            .iter()
            .map(|substation| self.substation_geo_data(substation, &index).boxed())
            .collect();
        let located: Vec<Option<SubstationGeoData>> = stream::iter(tasks)
            .buffered(LOOKUP_CONCURRENCY)
            .try_collect()
            .await?;

        let found: Vec<SubstationGeoData> = located.into_iter().flatten().collect();
        debug!(
            "Network {}: {} of {} substations located",
            network_id,
            found.len(),
            network.substations.len()
        );
        Ok(found)
    }

    /// Every line of the network, optionally at one voltage
    ///
    /// Unresolved lines are ordered on the fly and not written back. Lines
    /// with an unlocated side are omitted.
    pub async fn lines(&self, network_id: Uuid, voltage: Option<u32>) -> Result<Vec<LineGeoData>> {
        let network = self.network.get_network(network_id).await?;
        self.collect_lines(&network, voltage, false).await
    }

    /// Only the lines already resolved in the store
    pub async fn known_lines(
        &self,
        network_id: Uuid,
        voltage: Option<u32>,
    ) -> Result<Vec<LineGeoData>> {
        let network = self.network.get_network(network_id).await?;
        self.collect_lines(&network, voltage, true).await
    }

    async fn collect_lines(
        &self,
        network: &NetworkModel,
        voltage: Option<u32>,
        resolved_only: bool,
    ) -> Result<Vec<LineGeoData>> {
        let index = network.substation_index();
        let selected: Vec<&NetworkLine> = network
            .lines
            .iter()
            .filter(|line| voltage.is_none() || voltage == Some(line.voltage))
            .collect();

        let tasks: Vec<BoxFuture<'_, geo_store::Result<Option<LineGeoData>>>> = selected
            .into_iter()
            .map(|line| self.line_geo_data(line, &index, resolved_only).boxed())
            .collect();
        let lines: Vec<Option<LineGeoData>> = stream::iter(tasks)
            .buffered(LOOKUP_CONCURRENCY)
            .try_collect()
            .await?;

        Ok(lines.into_iter().flatten().collect())
    }

    async fn substation_geo_data(
        &self,
        substation: &NetworkSubstation,
        index: &HashMap<&str, &NetworkSubstation>,
    ) -> geo_store::Result<Option<SubstationGeoData>> {
        let endpoint = locate_endpoint(self.store.as_ref(), &substation.id, index).await?;
        Ok(endpoint.map(|e| SubstationGeoData {
            id: substation.id.clone(),
            country: e.country,
            coordinate: e.position,
        }))
    }

    /// Stored geometry when resolved, otherwise ordered on the fly
    async fn line_geo_data(
        &self,
        line: &NetworkLine,
        index: &HashMap<&str, &NetworkSubstation>,
        resolved_only: bool,
    ) -> geo_store::Result<Option<LineGeoData>> {
        if let Some(resolved) = self.store.get_resolved(&line.id).await? {
            return Ok(Some(LineGeoData::from(resolved)));
        }
        if resolved_only {
            return Ok(None);
        }

        let side1 = locate_endpoint(self.store.as_ref(), &line.side1_substation_id, index).await?;
        let side2 = locate_endpoint(self.store.as_ref(), &line.side2_substation_id, index).await?;
        let (Some(side1), Some(side2)) = (side1, side2) else {
            debug!("Line {} omitted: side substation not located", line.id);
            return Ok(None);
        };

        let samples = self.store.get_raw_samples(&line.id).await?;
        Ok(Some(LineGeoData {
            id: line.id.clone(),
            country: line.country,
            voltage: line.voltage,
            aerial: line.aerial,
            coordinates: resolve(side1.position, side2.position, &samples),
        }))
    }

    /// Upsert substations from raw JSON records, skipping invalid ones
    pub async fn save_substations(&self, records: Vec<Value>) -> Result<IngestReport> {
        let mut report = IngestReport {
            received: records.len(),
            ..Default::default()
        };
        let substations: Vec<Substation> =
            validate_records::<SubstationRecord, Substation>(records, &mut report);

        report.stored = substations.len();
        if !substations.is_empty() {
            self.store.save_substations(substations).await?;
        }
        info!(
            "Substations ingested: {} stored, {} rejected",
            report.stored,
            report.rejected.len()
        );
        Ok(report)
    }

    /// Insert new lines from raw JSON records
    ///
    /// Ids already present are ignored, so resolved geometry is never
    /// overwritten. Invalid records are skipped.
    pub async fn save_lines(&self, records: Vec<Value>) -> Result<IngestReport> {
        let mut report = IngestReport {
            received: records.len(),
            ..Default::default()
        };
        let lines: Vec<RawLine> = validate_records::<LineRecord, RawLine>(records, &mut report);

        let valid = lines.len();
        if valid > 0 {
            report.stored = self.store.save_lines(lines).await?;
        }
        report.ignored_existing = valid - report.stored;
        info!(
            "Lines ingested: {} stored, {} already present, {} rejected",
            report.stored,
            report.ignored_existing,
            report.rejected.len()
        );
        Ok(report)
    }
}

/// Deserialize and validate each record on its own
fn validate_records<R, T>(records: Vec<Value>, report: &mut IngestReport) -> Vec<T>
where
    R: DeserializeOwned,
    T: TryFrom<R, Error = geo_model::ModelError>,
{
    let mut valid = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string);
        let outcome = serde_json::from_value::<R>(record)
            .map_err(|e| e.to_string())
            .and_then(|r| T::try_from(r).map_err(|e| e.to_string()));

        match outcome {
            Ok(item) => valid.push(item),
            Err(reason) => {
                warn!("Record {} ({:?}) rejected: {}", index, id, reason);
                report.rejected.push(RejectedRecord { index, id, reason });
            },
        }
    }
    valid
}
