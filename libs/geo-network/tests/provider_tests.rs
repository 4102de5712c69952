//! Integration tests for the file and HTTP topology sources

// Allow unwrap() in tests for cleaner test code
#![allow(clippy::disallowed_methods)]

use std::time::Duration;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use geo_model::{Country, NetworkModel, NetworkSubstation};
use geo_network::{FileNetworkProvider, HttpNetworkProvider, NetworkError, NetworkProvider};
use serde_json::{json, Value};
use uuid::Uuid;

fn sample_network(id: Uuid) -> NetworkModel {
    let mut network = NetworkModel::new(id);
    network.substations.push(NetworkSubstation {
        id: "s1".to_string(),
        country: Country::FR,
        position: None,
        voltage_levels: [400].into_iter().collect(),
    });
    network
}

// ============================================================================
// File provider
// ============================================================================

#[tokio::test]
async fn test_file_provider_reads_json() {
    let dir = tempfile::tempdir().unwrap();
    let id = Uuid::new_v4();
    std::fs::write(
        dir.path().join(format!("{}.json", id)),
        serde_json::to_string(&sample_network(id)).unwrap(),
    )
    .unwrap();

    let provider = FileNetworkProvider::new(dir.path());
    let network = provider.get_network(id).await.unwrap();
    assert_eq!(network, sample_network(id));
}

#[tokio::test]
async fn test_file_provider_reads_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let id = Uuid::new_v4();
    let yaml = format!(
        "id: {}\nsubstations:\n  - id: s1\n    country: fr\n    position: {{ lat: 48.8, lon: 2.3 }}\nlines:\n  - id: l1\n    country: FR\n    voltage: 400\n    side1_substation_id: s1\n    side2_substation_id: s2\n",
        id
    );
    std::fs::write(dir.path().join(format!("{}.yml", id)), yaml).unwrap();

    let provider = FileNetworkProvider::new(dir.path());
    let network = provider.get_network(id).await.unwrap();
    assert_eq!(network.substations[0].country, Country::FR);
    assert!(network.lines[0].aerial);
    assert_eq!(network.lines[0].side2_substation_id, "s2");
}

#[tokio::test]
async fn test_file_provider_unknown_network() {
    let dir = tempfile::tempdir().unwrap();
    let provider = FileNetworkProvider::new(dir.path());
    let err = provider.get_network(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, NetworkError::NotFound(_)));
}

#[tokio::test]
async fn test_file_provider_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let provider = FileNetworkProvider::new(dir.path().join("absent"));
    let err = provider.get_network(Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_file_provider_rejects_mismatched_id() {
    let dir = tempfile::tempdir().unwrap();
    let id = Uuid::new_v4();
    std::fs::write(
        dir.path().join(format!("{}.json", id)),
        serde_json::to_string(&sample_network(Uuid::new_v4())).unwrap(),
    )
    .unwrap();

    let provider = FileNetworkProvider::new(dir.path());
    let err = provider.get_network(id).await.unwrap_err();
    assert!(matches!(err, NetworkError::Parse(_)));
}

#[tokio::test]
async fn test_file_provider_reports_invalid_content() {
    let dir = tempfile::tempdir().unwrap();
    let id = Uuid::new_v4();
    std::fs::write(dir.path().join(format!("{}.json", id)), "{ not json").unwrap();

    let provider = FileNetworkProvider::new(dir.path());
    let err = provider.get_network(id).await.unwrap_err();
    assert!(matches!(err, NetworkError::Parse(msg) if msg.contains(".json")));
}

// ============================================================================
// HTTP provider
// ============================================================================

async fn spawn_network_service(known: Uuid) -> String {
    let app = Router::new().route(
        "/v1/networks/{id}",
        get(move |Path(id): Path<Uuid>| async move {
            if id == known {
                Ok(Json(json!({ "success": true, "data": sample_network(id) })))
            } else {
                Err((StatusCode::NOT_FOUND, Json(Value::Null)))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_http_provider_fetches_enveloped_network() {
    let id = Uuid::new_v4();
    let base_url = spawn_network_service(id).await;

    let provider = HttpNetworkProvider::new(base_url, Duration::from_secs(5)).unwrap();
    let network = provider.get_network(id).await.unwrap();
    assert_eq!(network, sample_network(id));
}

#[tokio::test]
async fn test_http_provider_maps_404() {
    let base_url = spawn_network_service(Uuid::new_v4()).await;

    let provider = HttpNetworkProvider::new(base_url, Duration::from_secs(5)).unwrap();
    let err = provider.get_network(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, NetworkError::NotFound(_)));
}

#[tokio::test]
async fn test_http_provider_unreachable() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider =
        HttpNetworkProvider::new(format!("http://{}", addr), Duration::from_secs(2)).unwrap();
    let err = provider.get_network(Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_retryable());
}
