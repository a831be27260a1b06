//! Integration tests for the counter API.
//!
//! In-memory tests run by default. DynamoDB tests need DynamoDB Local
//! (`docker run -p 8000:8000 amazon/dynamodb-local`) and are ignored:
//! Run with: cargo test --test integration -- --ignored

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use futures::future::join_all;
use serde_json::Value;
use tower::ServiceExt;

use counter_api::api::{cors_layer, create_router, AppState};
use counter_api::config::Config;
use counter_api::counter::{CounterService, COUNTER_ID};
use counter_api::store::{CounterStore, DynamoStore, MemoryConfig, MemoryStore};

fn router(store: Arc<dyn CounterStore>) -> Router {
    create_router(
        AppState::new(CounterService::new(store)),
        cors_layer(None),
    )
}

async fn send(app: &Router, method: Method, body: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri("/counter")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Concurrent +1 increments are never lost, whatever the interleaving.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_increments_sum_exactly() {
    let store = MemoryStore::with_config(MemoryConfig {
        latency_ms: 1,
        ..Default::default()
    });
    let app = router(Arc::new(store));

    let (_, start) = send(&app, Method::POST, r#"{"increment": 10}"#).await;
    let start = start["count"].as_i64().unwrap();

    let k = 100;
    let results = join_all((0..k).map(|_| {
        let app = app.clone();
        tokio::spawn(async move { send(&app, Method::POST, "").await })
    }))
    .await;

    for result in results {
        let (status, _) = result.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&app, Method::GET, "").await;
    assert_eq!(body["count"].as_i64().unwrap(), start + k);
}

/// Full lifecycle: never -> increments -> reset.
#[tokio::test]
async fn counter_lifecycle() {
    let app = router(Arc::new(MemoryStore::new()));

    let (status, body) = send(&app, Method::GET, "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["timestamp"], "never");

    let (_, body) = send(&app, Method::POST, r#"{"increment": 3}"#).await;
    assert_eq!(body["count"], 3);
    let first_stamp = body["timestamp"].as_str().unwrap().to_string();

    let (_, body) = send(&app, Method::POST, "").await;
    assert_eq!(body["count"], 4);
    assert!(body["timestamp"].as_str().unwrap() >= first_stamp.as_str());

    let (_, body) = send(&app, Method::DELETE, "").await;
    assert_eq!(body["count"], 0);

    let (_, body) = send(&app, Method::GET, "").await;
    assert_eq!(body["count"], 0);
    assert_ne!(body["timestamp"], "never");
}

fn local_config(test: &str) -> Config {
    let config = Config::load_validated().expect("valid configuration");
    Config {
        table_name: format!("counter_api_{test}_{}", std::process::id()),
        ..config
    }
}

/// Test the atomic add against DynamoDB Local.
#[tokio::test]
#[ignore = "requires DynamoDB Local on localhost:8000"]
async fn dynamodb_increments_are_atomic() {
    let config = local_config("atomic");
    let store = DynamoStore::from_config(&config).await;
    store.ensure_table().await.expect("create table");

    let service = CounterService::new(Arc::new(store.clone()));
    service.reset().await.expect("reset");

    let results = join_all((0..20).map(|_| {
        let service = service.clone();
        tokio::spawn(async move { service.increment(1).await })
    }))
    .await;

    for result in results {
        result.unwrap().expect("increment");
    }

    let counter = store.get(COUNTER_ID).await.unwrap().unwrap();
    assert_eq!(counter.count, 20);
}

/// Test that setup is idempotent against DynamoDB Local.
#[tokio::test]
#[ignore = "requires DynamoDB Local on localhost:8000"]
async fn dynamodb_setup_is_idempotent() {
    let config = local_config("setup");
    let store = DynamoStore::from_config(&config).await;
    let service = CounterService::new(Arc::new(store));

    let first = service.setup().await.expect("first setup");
    service.increment(2).await.expect("increment");
    let second = service.setup().await.expect("second setup");

    assert_eq!(second.count, first.count + 2);
}

/// An unreachable store surfaces as a sanitized 500.
#[tokio::test]
async fn unreachable_dynamodb_returns_generic_error() {
    // Reserve a port, then free it so connections are refused.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = Config {
        dynamodb_endpoint: format!("http://{addr}"),
        ..Config::default()
    };
    let app = router(Arc::new(DynamoStore::from_config(&config).await));

    let (status, body) = send(&app, Method::GET, "").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");
    assert!(!body["message"].as_str().unwrap().contains("127.0.0.1"));
}
