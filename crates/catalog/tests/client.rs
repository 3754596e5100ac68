//! Integration tests for [`CatalogClient`] against an in-process stub of the
//! sibling services.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use plans_catalog::{CatalogClient, CatalogConfig, CatalogError, CatalogSource};
use plans_core::plan::PlanState;
use serde::Deserialize;
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Stub server
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct IdsQuery {
    lang: String,
    state: String,
    ids: String,
}

#[derive(Deserialize)]
struct AppQuery {
    app: String,
    lang: String,
    state: String,
    #[serde(rename = "type")]
    content_type: String,
}

async fn lookup(
    State(hits): State<Arc<AtomicUsize>>,
    Query(q): Query<IdsQuery>,
) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    let items: Vec<Value> = q
        .ids
        .split(',')
        .map(|id| json!({ "id": id.parse::<i64>().unwrap(), "lang": q.lang, "state": q.state }))
        .collect();
    Json(Value::Array(items))
}

async fn app_data(Query(q): Query<AppQuery>) -> Json<Value> {
    Json(json!([{ "app": q.app, "lang": q.lang, "state": q.state, "type": q.content_type }]))
}

async fn failing() -> (StatusCode, &'static str) {
    (StatusCode::SERVICE_UNAVAILABLE, "maintenance")
}

async fn not_json() -> &'static str {
    "this is not json"
}

/// Spawn the stub on an ephemeral port and return its base URL and hit counter.
async fn spawn_stub() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/workouts/ids", get(lookup))
        .route("/tags/ids", get(lookup))
        .route("/apps/data", get(app_data))
        .route("/down/tags/ids", get(failing))
        .route("/garbled/workouts/ids", get(not_json))
        .with_state(Arc::clone(&hits));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), hits)
}

fn config_for(base: &str) -> CatalogConfig {
    CatalogConfig {
        workouts_url: base.to_string(),
        tags_url: base.to_string(),
        apps_url: base.to_string(),
        request_timeout: Duration::from_secs(5),
    }
}

fn client_for(base: &str) -> CatalogClient {
    CatalogClient::new(config_for(base)).unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn workouts_lookup_sends_released_state_and_comma_list() {
    let (base, hits) = spawn_stub().await;
    let client = client_for(&base);

    let workouts = client.workouts_by_ids("en", &[3, 1, 2]).await.unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    let ids: Vec<i64> = workouts
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 1, 2]);
    assert_eq!(workouts[0]["state"], "R");
    assert_eq!(workouts[0]["lang"], "en");
}

#[tokio::test]
async fn clients_can_share_one_http_pool() {
    let (base, hits) = spawn_stub().await;
    let shared = reqwest::Client::new();
    let first = CatalogClient::with_client(shared.clone(), config_for(&base));
    let second = CatalogClient::with_client(shared, config_for(&base));

    let (workouts, tags) = tokio::join!(
        first.workouts_by_ids("en", &[4]),
        second.tags_by_ids("en", &[5]),
    );

    assert_eq!(workouts.unwrap(), json!([{ "id": 4, "lang": "en", "state": "R" }]));
    assert_eq!(tags.unwrap(), json!([{ "id": 5, "lang": "en", "state": "R" }]));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn tags_lookup_uses_tags_endpoint() {
    let (base, _hits) = spawn_stub().await;
    let client = client_for(&base);

    let tags = client.tags_by_ids("de", &[9]).await.unwrap();
    assert_eq!(tags, json!([{ "id": 9, "lang": "de", "state": "R" }]));
}

#[tokio::test]
async fn empty_id_list_resolves_without_request() {
    let (base, hits) = spawn_stub().await;
    let client = client_for(&base);

    let workouts = client.workouts_by_ids("en", &[]).await.unwrap();
    let tags = client.tags_by_ids("en", &[]).await.unwrap();

    assert_eq!(workouts, json!([]));
    assert_eq!(tags, json!([]));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn app_plans_forwards_filters_and_content_type() {
    let (base, _hits) = spawn_stub().await;
    let client = client_for(&base);

    let data = client
        .app_plans("runner", "en", PlanState::Provisional)
        .await
        .unwrap();
    assert_eq!(
        data,
        json!([{ "app": "runner", "lang": "en", "state": "P", "type": "training_plans" }])
    );
}

#[tokio::test]
async fn non_success_status_becomes_api_error() {
    let (base, _hits) = spawn_stub().await;
    let client = CatalogClient::new(CatalogConfig {
        workouts_url: base.clone(),
        tags_url: format!("{base}/down"),
        apps_url: base,
        request_timeout: Duration::from_secs(5),
    })
    .unwrap();

    let err = client.tags_by_ids("en", &[1]).await.unwrap_err();
    match err {
        CatalogError::ApiError { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_json_becomes_request_error() {
    let (base, _hits) = spawn_stub().await;
    let client = CatalogClient::new(CatalogConfig {
        workouts_url: format!("{base}/garbled"),
        tags_url: base.clone(),
        apps_url: base,
        request_timeout: Duration::from_secs(5),
    })
    .unwrap();

    let err = client.workouts_by_ids("en", &[1]).await.unwrap_err();
    assert!(matches!(err, CatalogError::Request(_)));
}
