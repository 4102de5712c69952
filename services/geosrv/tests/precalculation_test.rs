//! Precalculation pass tests against the in-memory backends

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

mod fixtures;

use async_trait::async_trait;
use fixtures::{assert_close, points, store_samples, NetworkBuilder};
use geo_model::{Country, Position, RawLine, ResolvedLine, Substation};
use geo_network::MemoryNetworkProvider;
use geo_store::{GeoStore, MemoryGeoStore, StoreError};
use geosrv::{GeoSrvError, PrecalculationConfig, PrecalculationCoordinator};
use std::sync::Arc;
use uuid::Uuid;

fn coordinator(
    store: Arc<dyn GeoStore>,
    network: geo_model::NetworkModel,
    config: PrecalculationConfig,
) -> PrecalculationCoordinator {
    PrecalculationCoordinator::new(
        store,
        Arc::new(MemoryNetworkProvider::from(network)),
        config,
    )
}

/// Sequential scheduling so wave-internal order follows the network order
fn sequential() -> PrecalculationConfig {
    PrecalculationConfig {
        concurrency: 1,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_only_unresolved_lines_are_written() {
    let network = NetworkBuilder::new()
        .substation("a", Country::FR, (0.0, 0.0))
        .substation("b", Country::FR, (10.0, 0.0))
        .line("l1", 400, "a", "b")
        .line("l2", 400, "a", "b")
        .line("l3", 225, "a", "b")
        .build();
    let id = network.id;

    let store = Arc::new(MemoryGeoStore::new());
    store.insert_line(RawLine {
        id: "l1".to_string(),
        country: Country::FR,
        voltage: 400,
        aerial: true,
        samples: points(&[(0.0, 0.0), (5.0, 3.0), (10.0, 0.0)]),
        resolved: true,
    });
    store_samples(&store, "l2", 400, &[(7.0, -1.0), (3.0, 1.0), (5.0, 0.0)]).await;

    let report = coordinator(store.clone(), network, PrecalculationConfig::default())
        .precalculate(id)
        .await
        .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.skipped_resolved, 1);
    assert_eq!(report.resolved, 2);
    assert_eq!(store.stats().resolved_writes, 2);

    assert_eq!(
        store.get_resolved("l2").await.unwrap().unwrap().path,
        points(&[(0.0, 0.0), (3.0, 1.0), (5.0, 0.0), (7.0, -1.0), (10.0, 0.0)])
    );
    // l1 keeps its stored path
    assert_eq!(
        store.get_resolved("l1").await.unwrap().unwrap().path[1],
        Position::new(5.0, 3.0)
    );
}

#[tokio::test]
async fn test_second_pass_does_no_work() {
    let network = NetworkBuilder::new()
        .substation("a", Country::FR, (0.0, 0.0))
        .substation("b", Country::FR, (10.0, 0.0))
        .line("l1", 400, "a", "b")
        .line("l2", 400, "a", "b")
        .build();
    let id = network.id;

    let store = Arc::new(MemoryGeoStore::new());
    store_samples(&store, "l1", 400, &[(5.0, 1.0)]).await;
    let coordinator = coordinator(store.clone(), network, PrecalculationConfig::default());

    let first = coordinator.precalculate(id).await.unwrap();
    assert_eq!(first.resolved, 2);
    let paths: Vec<_> = ["l1", "l2"]
        .iter()
        .map(|id| store.line(id).unwrap())
        .collect();

    store.reset_stats();
    let second = coordinator.precalculate(id).await.unwrap();
    assert_eq!(second.resolved, 0);
    assert_eq!(second.skipped_resolved, 2);

    let stats = store.stats();
    assert_eq!(stats.resolved_writes, 0);
    assert_eq!(stats.raw_sample_reads, 0);
    let after: Vec<_> = ["l1", "l2"]
        .iter()
        .map(|id| store.line(id).unwrap())
        .collect();
    assert_eq!(paths, after);
}

#[tokio::test]
async fn test_empty_line_borrows_skeleton_shape() {
    let network = NetworkBuilder::new()
        .substation("a", Country::FR, (0.0, 0.0))
        .substation("b", Country::FR, (10.0, 0.0))
        .substation("c", Country::FR, (0.0, 10.0))
        .substation("d", Country::FR, (0.0, 20.0))
        // empty line listed first still runs in the second wave
        .line("empty", 400, "c", "d")
        .line("sampled", 400, "a", "b")
        .build();
    let id = network.id;

    let store = Arc::new(MemoryGeoStore::new());
    store_samples(&store, "sampled", 400, &[(5.0, 2.0)]).await;

    let report = coordinator(store.clone(), network, sequential())
        .precalculate(id)
        .await
        .unwrap();
    assert_eq!(report.from_samples, 1);
    assert_eq!(report.from_skeleton, 1);
    assert_eq!(report.skeletons_cached, 1);

    let path = store.get_resolved("empty").await.unwrap().unwrap().path;
    assert_eq!(path.len(), 3, "one interior point, as in the skeleton");
    assert_eq!(path[0], Position::new(0.0, 10.0));
    assert_eq!(path[2], Position::new(0.0, 20.0));
    // halfway along the chord, offset to its left by a fifth of its length
    assert_close(path[1], (-2.0, 15.0));
}

#[tokio::test]
async fn test_first_sampled_line_defines_the_skeleton() {
    let network = NetworkBuilder::new()
        .substation("a", Country::FR, (0.0, 0.0))
        .substation("b", Country::FR, (10.0, 0.0))
        .line("first", 400, "a", "b")
        .line("second", 400, "a", "b")
        .line("empty", 400, "b", "a")
        .build();
    let id = network.id;

    let store = Arc::new(MemoryGeoStore::new());
    store_samples(&store, "first", 400, &[(5.0, 1.0)]).await;
    store_samples(&store, "second", 400, &[(2.0, 1.0), (5.0, 2.0), (8.0, 1.0)]).await;

    let report = coordinator(store.clone(), network, sequential())
        .precalculate(id)
        .await
        .unwrap();
    assert_eq!(report.from_skeleton, 1);
    assert_eq!(report.skeletons_cached, 1);

    // Shape follows the borrowing line's own side-1 to side-2 chord
    let path = store.get_resolved("empty").await.unwrap().unwrap().path;
    assert_eq!(path.len(), 3);
    assert_eq!(path[0], Position::new(10.0, 0.0));
    assert_eq!(path[2], Position::new(0.0, 0.0));
    assert_close(path[1], (5.0, -1.0));
}

#[tokio::test]
async fn test_sampled_lines_never_use_skeletons() {
    let network = NetworkBuilder::new()
        .substation("a", Country::FR, (0.0, 0.0))
        .substation("b", Country::FR, (10.0, 0.0))
        .line("first", 400, "a", "b")
        .line("second", 400, "a", "b")
        .build();
    let id = network.id;

    let store = Arc::new(MemoryGeoStore::new());
    store_samples(&store, "first", 400, &[(5.0, 1.0)]).await;
    store_samples(&store, "second", 400, &[(8.0, -1.0), (2.0, -1.0)]).await;

    let report = coordinator(store.clone(), network, sequential())
        .precalculate(id)
        .await
        .unwrap();
    assert_eq!(report.from_samples, 2);
    assert_eq!(
        store.get_resolved("second").await.unwrap().unwrap().path,
        points(&[(0.0, 0.0), (2.0, -1.0), (8.0, -1.0), (10.0, 0.0)])
    );
}

#[tokio::test]
async fn test_skeletons_are_keyed_by_voltage() {
    let network = NetworkBuilder::new()
        .substation("a", Country::FR, (0.0, 0.0))
        .substation("b", Country::FR, (10.0, 0.0))
        .line("hv", 400, "a", "b")
        .line("mv", 225, "a", "b")
        .build();
    let id = network.id;

    let store = Arc::new(MemoryGeoStore::new());
    store_samples(&store, "hv", 400, &[(5.0, 1.0)]).await;

    let report = coordinator(store.clone(), network, PrecalculationConfig::default())
        .precalculate(id)
        .await
        .unwrap();
    assert_eq!(report.from_skeleton, 0);
    assert_eq!(report.straight, 1);
    assert_eq!(
        store.get_resolved("mv").await.unwrap().unwrap().path,
        points(&[(0.0, 0.0), (10.0, 0.0)])
    );
}

#[tokio::test]
async fn test_missing_substation_leaves_line_unresolved() {
    let network = NetworkBuilder::new()
        .substation("a", Country::FR, (0.0, 0.0))
        .substation("b", Country::FR, (10.0, 0.0))
        .unplaced_substation("x", Country::BE)
        .line("ok", 400, "a", "b")
        .line("unplaced", 400, "a", "x")
        .line("unknown", 400, "ghost", "b")
        .build();
    let id = network.id;

    let store = Arc::new(MemoryGeoStore::new());
    store_samples(&store, "unplaced", 400, &[(1.0, 1.0)]).await;

    let report = coordinator(store.clone(), network, PrecalculationConfig::default())
        .precalculate(id)
        .await
        .unwrap();
    assert_eq!(report.resolved, 1);
    let mut missing = report.missing_substations.clone();
    missing.sort();
    assert_eq!(missing, vec!["unknown".to_string(), "unplaced".to_string()]);
    assert!(!store.is_resolved("unplaced").await.unwrap());

    // Placing the substation later lets the next pass pick the line up
    store
        .save_substations(vec![Substation {
            id: "x".to_string(),
            country: Country::BE,
            position: Position::new(0.0, 2.0),
            voltage_levels: Default::default(),
        }])
        .await
        .unwrap();
    let network = NetworkBuilder::new()
        .substation("a", Country::FR, (0.0, 0.0))
        .unplaced_substation("x", Country::BE)
        .line("unplaced", 400, "a", "x")
        .build();
    let id = network.id;
    let report = coordinator(store.clone(), network, PrecalculationConfig::default())
        .precalculate(id)
        .await
        .unwrap();
    assert_eq!(report.from_samples, 1);
    assert_eq!(
        store.get_resolved("unplaced").await.unwrap().unwrap().path,
        points(&[(0.0, 0.0), (1.0, 1.0), (0.0, 2.0)])
    );
}

#[tokio::test]
async fn test_unknown_network() {
    let store = Arc::new(MemoryGeoStore::new());
    let coordinator = PrecalculationCoordinator::new(
        store,
        Arc::new(MemoryNetworkProvider::new()),
        PrecalculationConfig::default(),
    );
    let err = coordinator.precalculate(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, GeoSrvError::NetworkNotFound(_)));
}

/// Store whose writes fail for one line id
struct FailingStore {
    inner: MemoryGeoStore,
    fail_on: &'static str,
}

#[async_trait]
impl GeoStore for FailingStore {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn save_substations(&self, substations: Vec<Substation>) -> geo_store::Result<()> {
        self.inner.save_substations(substations).await
    }

    async fn get_substation(&self, id: &str) -> geo_store::Result<Option<Substation>> {
        self.inner.get_substation(id).await
    }

    async fn save_lines(&self, lines: Vec<RawLine>) -> geo_store::Result<usize> {
        self.inner.save_lines(lines).await
    }

    async fn get_raw_samples(&self, line_id: &str) -> geo_store::Result<Vec<Position>> {
        self.inner.get_raw_samples(line_id).await
    }

    async fn get_resolved(&self, line_id: &str) -> geo_store::Result<Option<ResolvedLine>> {
        self.inner.get_resolved(line_id).await
    }

    async fn put_resolved(&self, line: ResolvedLine) -> geo_store::Result<()> {
        if line.id == self.fail_on {
            return Err(StoreError::Unavailable("disk full".to_string()));
        }
        self.inner.put_resolved(line).await
    }

    async fn is_resolved(&self, line_id: &str) -> geo_store::Result<bool> {
        self.inner.is_resolved(line_id).await
    }

    async fn line_count(&self) -> geo_store::Result<usize> {
        self.inner.line_count().await
    }
}

#[tokio::test]
async fn test_store_failure_aborts_and_keeps_progress() {
    let network = NetworkBuilder::new()
        .substation("a", Country::FR, (0.0, 0.0))
        .substation("b", Country::FR, (10.0, 0.0))
        .line("good", 400, "a", "b")
        .line("bad", 400, "a", "b")
        .line("later", 400, "a", "b")
        .build();
    let id = network.id;

    let store = Arc::new(FailingStore {
        inner: MemoryGeoStore::new(),
        fail_on: "bad",
    });
    for line_id in ["good", "bad"] {
        store_samples(&store.inner, line_id, 400, &[(5.0, 1.0)]).await;
    }

    let err = coordinator(store.clone(), network, sequential())
        .precalculate(id)
        .await
        .unwrap_err();
    assert!(matches!(err, GeoSrvError::Store(StoreError::Unavailable(_))));
    assert!(err.is_retryable());

    assert!(store.is_resolved("good").await.unwrap());
    assert!(!store.is_resolved("bad").await.unwrap());
    // the empty-sample wave never started
    assert!(!store.is_resolved("later").await.unwrap());
}

#[tokio::test]
async fn test_persistent_skeletons_survive_passes() {
    let seed = NetworkBuilder::new()
        .substation("a", Country::FR, (0.0, 0.0))
        .substation("b", Country::BE, (10.0, 0.0))
        .line("seed", 400, "a", "b")
        .build();
    let target = NetworkBuilder::new()
        .substation("c", Country::BE, (20.0, 0.0))
        .substation("d", Country::FR, (0.0, 0.0))
        .line("target", 400, "c", "d")
        .build();
    let (seed_id, target_id) = (seed.id, target.id);

    let networks = Arc::new(MemoryNetworkProvider::new());
    networks.insert(seed);
    networks.insert(target);

    for (persist, expected_skeleton) in [(true, 1), (false, 0)] {
        let store = Arc::new(MemoryGeoStore::new());
        store_samples(&store, "seed", 400, &[(5.0, 1.0)]).await;
        let coordinator = PrecalculationCoordinator::new(
            store.clone(),
            networks.clone(),
            PrecalculationConfig {
                persist_skeletons: persist,
                ..Default::default()
            },
        );

        coordinator.precalculate(seed_id).await.unwrap();
        let report = coordinator.precalculate(target_id).await.unwrap();
        assert_eq!(report.from_skeleton, expected_skeleton, "persist={}", persist);
        assert_eq!(coordinator.persistent_skeletons().len(), expected_skeleton);

        if persist {
            // BE->FR target runs through the shape the FR->BE seed stored
            let path = store.get_resolved("target").await.unwrap().unwrap().path;
            assert_eq!(path.len(), 3);
            assert_close(path[1], (10.0, 2.0));
        }
    }
}

#[tokio::test]
async fn test_single_wave_mode_stays_correct() {
    let network = NetworkBuilder::new()
        .substation("a", Country::FR, (0.0, 0.0))
        .substation("b", Country::FR, (10.0, 0.0))
        .line("empty", 400, "a", "b")
        .line("sampled", 400, "a", "b")
        .build();
    let id = network.id;

    let store = Arc::new(MemoryGeoStore::new());
    store_samples(&store, "sampled", 400, &[(5.0, 1.0)]).await;

    let report = coordinator(
        store.clone(),
        network,
        PrecalculationConfig {
            concurrency: 1,
            ordered_waves: false,
            ..Default::default()
        },
    )
    .precalculate(id)
    .await
    .unwrap();

    // The empty line ran before any skeleton existed
    assert_eq!(report.resolved, 2);
    assert_eq!(report.straight, 1);
    assert_eq!(report.from_samples, 1);
    let path = store.get_resolved("empty").await.unwrap().unwrap().path;
    assert_eq!(path, points(&[(0.0, 0.0), (10.0, 0.0)]));
}

#[tokio::test]
async fn test_parallel_pass_resolves_everything() {
    let mut builder = NetworkBuilder::new()
        .substation("a", Country::FR, (0.0, 0.0))
        .substation("b", Country::FR, (10.0, 0.0));
    let store = Arc::new(MemoryGeoStore::new());
    for i in 0..50 {
        let line_id = format!("l{}", i);
        builder = builder.line(&line_id, 400, "a", "b");
        if i % 2 == 0 {
            store_samples(&store, &line_id, 400, &[(7.0, 1.0), (3.0, 1.0)]).await;
        }
    }
    let network = builder.build();
    let id = network.id;

    let report = coordinator(
        store.clone(),
        network,
        PrecalculationConfig {
            concurrency: 16,
            ..Default::default()
        },
    )
    .precalculate(id)
    .await
    .unwrap();

    assert_eq!(report.resolved, 50);
    assert_eq!(report.from_samples, 25);
    assert_eq!(report.from_skeleton, 25);
    assert_eq!(store.stats().resolved_count, 50);
    for i in 0..50 {
        let path = store.get_resolved(&format!("l{}", i)).await.unwrap().unwrap().path;
        assert_eq!(path.len(), 4);
    }
}
