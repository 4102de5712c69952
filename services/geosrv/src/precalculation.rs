//! Bulk line resolution
//!
//! A precalculation pass fetches a network snapshot, resolves every line the
//! store does not already hold as resolved, and writes the ordered paths
//! back. Lines with real samples run first so their shapes can seed the
//! skeleton cache for the empty-sample lines that follow.

use futures::future::{BoxFuture, FutureExt};
use futures::{stream, StreamExt, TryStreamExt};
use geo_model::{
    resolve, Country, NetworkLine, NetworkModel, NetworkSubstation, Position, ResolvedLine,
    SkeletonCache,
};
use geo_network::NetworkProvider;
use geo_store::GeoStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::Result;

/// When an unresolved line may borrow a cached skeleton
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FallbackTrigger {
    /// Only lines with zero stored samples
    #[default]
    EmptySamples,
    /// Never; empty-sample lines become straight two-point paths
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecalculationConfig {
    /// Lines resolved in parallel within a wave
    pub concurrency: usize,
    /// Resolve lines with samples before empty-sample lines
    pub ordered_waves: bool,
    pub fallback: FallbackTrigger,
    /// Keep skeletons across passes instead of one cache per pass
    pub persist_skeletons: bool,
    /// Upper bound for one pass started over HTTP, 0 disables
    pub timeout_secs: u64,
}

impl Default for PrecalculationConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            ordered_waves: true,
            fallback: FallbackTrigger::EmptySamples,
            persist_skeletons: false,
            timeout_secs: 300,
        }
    }
}

/// Outcome of one precalculation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PrecalculationReport {
    pub network_id: Uuid,
    /// Lines in the network
    pub total: usize,
    /// Already resolved before the pass
    pub skipped_resolved: usize,
    /// Written back by this pass
    pub resolved: usize,
    /// Resolved from their own samples
    pub from_samples: usize,
    /// Resolved from a cached skeleton
    pub from_skeleton: usize,
    /// Resolved as a straight two-point path
    pub straight: usize,
    /// Lines left unresolved because a side substation has no position
    pub missing_substations: Vec<String>,
    /// Skeletons held by the cache at the end of the pass
    pub skeletons_cached: usize,
}

/// Where a resolved line's intermediate points came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSource {
    Samples,
    Skeleton,
    Straight,
}

/// Located side of a line
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Endpoint {
    pub country: Country,
    pub position: Position,
}

/// Position of a substation: network snapshot first, stored geo data second
pub(crate) async fn locate_endpoint(
    store: &dyn GeoStore,
    substation_id: &str,
    index: &HashMap<&str, &NetworkSubstation>,
) -> geo_store::Result<Option<Endpoint>> {
    let known = index.get(substation_id);
    if let Some(position) = known.and_then(|s| s.position) {
        return Ok(known.map(|s| Endpoint {
            country: s.country,
            position,
        }));
    }

    Ok(store
        .get_substation(substation_id)
        .await?
        .map(|stored| Endpoint {
            country: known.map_or(stored.country, |s| s.country),
            position: stored.position,
        }))
}

/// Unresolved line with both endpoints located
struct PendingLine<'a> {
    line: &'a NetworkLine,
    side1: Endpoint,
    side2: Endpoint,
    samples: Vec<Position>,
}

enum Plan<'a> {
    AlreadyResolved,
    MissingSubstation(&'a str),
    Pending(PendingLine<'a>),
}

/// Drives precalculation passes against one store and one network source
pub struct PrecalculationCoordinator {
    store: Arc<dyn GeoStore>,
    network: Arc<dyn NetworkProvider>,
    config: PrecalculationConfig,
    skeletons: Arc<SkeletonCache>,
}

impl PrecalculationCoordinator {
    pub fn new(
        store: Arc<dyn GeoStore>,
        network: Arc<dyn NetworkProvider>,
        config: PrecalculationConfig,
    ) -> Self {
        Self {
            store,
            network,
            config,
            skeletons: Arc::new(SkeletonCache::new()),
        }
    }

    pub fn config(&self) -> &PrecalculationConfig {
        &self.config
    }

    /// Cache shared across passes, only consulted with `persist_skeletons`
    pub fn persistent_skeletons(&self) -> &SkeletonCache {
        &self.skeletons
    }

    /// Resolve every not-yet-resolved line of a network
    ///
    /// A store failure aborts the pass; lines written before it stay resolved.
    pub async fn precalculate(&self, network_id: Uuid) -> Result<PrecalculationReport> {
        let started = Instant::now();
        let network = self.network.get_network(network_id).await?;
        let skeletons = if self.config.persist_skeletons {
            Arc::clone(&self.skeletons)
        } else {
            Arc::new(SkeletonCache::new())
        };

        let mut report = PrecalculationReport {
            network_id,
            total: network.lines.len(),
            ..Default::default()
        };

        let pending = self.plan(&network, &mut report).await?;
        let waves = self.split_waves(pending);

        for (index, wave) in waves.into_iter().enumerate() {
            if wave.is_empty() {
                continue;
            }
            debug!("Network {} wave {}: {} lines", network_id, index + 1, wave.len());
            let tasks: Vec<BoxFuture<'_, Result<PathSource>>> = wave
                .into_iter()
                .map(|pending| self.resolve_line(pending, &skeletons).boxed())
                .collect();
            let sources: Vec<PathSource> = stream::iter(tasks)
                .buffer_unordered(self.concurrency())
                .try_collect()
                .await?;

            for source in sources {
                report.resolved += 1;
                match source {
                    PathSource::Samples => report.from_samples += 1,
                    PathSource::Skeleton => report.from_skeleton += 1,
                    PathSource::Straight => report.straight += 1,
                }
            }
        }

        report.skeletons_cached = skeletons.len();
        info!(
            "Precalculated network {}: {} lines, {} resolved ({} samples, {} skeleton, {} straight), {} skipped, {} missing substations, {} skeletons in {:?}",
            network_id,
            report.total,
            report.resolved,
            report.from_samples,
            report.from_skeleton,
            report.straight,
            report.skipped_resolved,
            report.missing_substations.len(),
            report.skeletons_cached,
            started.elapsed()
        );
        Ok(report)
    }

    fn concurrency(&self) -> usize {
        self.config.concurrency.max(1)
    }

    /// Classify every line, reading samples for the ones to resolve
    async fn plan<'a>(
        &self,
        network: &'a NetworkModel,
        report: &mut PrecalculationReport,
    ) -> Result<Vec<PendingLine<'a>>> {
        let index = network.substation_index();
        let tasks: Vec<BoxFuture<'_, Result<Plan<'a>>>> = network
            .lines
            .iter()
            .map(|line| self.plan_line(line, &index).boxed())
            .collect();
        let plans: Vec<Plan<'a>> = stream::iter(tasks)
            .buffered(self.concurrency())
            .try_collect()
            .await?;

        let mut pending = Vec::with_capacity(plans.len());
        for plan in plans {
            match plan {
                Plan::AlreadyResolved => report.skipped_resolved += 1,
                Plan::MissingSubstation(line_id) => {
                    report.missing_substations.push(line_id.to_string())
                },
                Plan::Pending(line) => pending.push(line),
            }
        }
        Ok(pending)
    }

    async fn plan_line<'a>(
        &self,
        line: &'a NetworkLine,
        index: &HashMap<&str, &NetworkSubstation>,
    ) -> Result<Plan<'a>> {
        if self.store.is_resolved(&line.id).await? {
            return Ok(Plan::AlreadyResolved);
        }

        let side1 = locate_endpoint(self.store.as_ref(), &line.side1_substation_id, index).await?;
        let side2 = locate_endpoint(self.store.as_ref(), &line.side2_substation_id, index).await?;
        let (Some(side1), Some(side2)) = (side1, side2) else {
            warn!(
                "Line {} skipped: no position for substation {} or {}",
                line.id, line.side1_substation_id, line.side2_substation_id
            );
            return Ok(Plan::MissingSubstation(&line.id));
        };

        let samples = self.store.get_raw_samples(&line.id).await?;
        Ok(Plan::Pending(PendingLine {
            line,
            side1,
            side2,
            samples,
        }))
    }

    fn split_waves<'a>(&self, pending: Vec<PendingLine<'a>>) -> Vec<Vec<PendingLine<'a>>> {
        if !self.config.ordered_waves {
            return vec![pending];
        }
        let (with_samples, empty): (Vec<_>, Vec<_>) =
            pending.into_iter().partition(|p| !p.samples.is_empty());
        vec![with_samples, empty]
    }

    async fn resolve_line(
        &self,
        pending: PendingLine<'_>,
        skeletons: &SkeletonCache,
    ) -> Result<PathSource> {
        let PendingLine {
            line,
            side1,
            side2,
            samples,
        } = pending;

        let (samples, source) = if !samples.is_empty() {
            (samples, PathSource::Samples)
        } else if self.config.fallback == FallbackTrigger::EmptySamples {
            match skeletons.substitute(
                side1.country,
                side2.country,
                line.voltage,
                side1.position,
                side2.position,
            ) {
                Some(substitute) => (substitute, PathSource::Skeleton),
                None => (Vec::new(), PathSource::Straight),
            }
        } else {
            (Vec::new(), PathSource::Straight)
        };

        let resolved = ResolvedLine {
            id: line.id.clone(),
            country: line.country,
            voltage: line.voltage,
            aerial: line.aerial,
            path: resolve(side1.position, side2.position, &samples),
        };

        // Shapes are learned from real samples only
        if source == PathSource::Samples && skeletons.offer(side1.country, side2.country, &resolved)
        {
            debug!("Line {} seeded a skeleton", line.id);
        }

        debug!(
            "Line {} resolved from {:?} ({} points)",
            line.id,
            source,
            resolved.path.len()
        );
        self.store.put_resolved(resolved).await?;
        Ok(source)
    }
}
