#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use plans_api::config::ServerConfig;
use plans_api::router::build_app_router;
use plans_api::state::AppState;
use plans_catalog::{CatalogConfig, CatalogError, CatalogSource};
use plans_core::plan::PlanState;
use plans_core::types::DbId;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

/// Asset base used by every test app.
pub const ASSET_BASE: &str = "https://cdn.test/";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        asset_base: ASSET_BASE.to_string(),
        enrichment_timeout_secs: 5,
        enrichment_concurrency: 4,
        catalog: CatalogConfig {
            workouts_url: "http://workouts.invalid".to_string(),
            tags_url: "http://tags.invalid".to_string(),
            apps_url: "http://apps.invalid".to_string(),
            request_timeout: std::time::Duration::from_secs(1),
        },
    }
}

// ---------------------------------------------------------------------------
// Stub catalog
// ---------------------------------------------------------------------------

/// In-memory stand-in for the workouts, tags and apps services.
///
/// Workout and tag lookups echo `{id, kind, state}` per requested id.
#[derive(Default)]
pub struct StubCatalog {
    pub calls: AtomicUsize,
    pub app_payload: Value,
    pub failing: bool,
}

impl StubCatalog {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_app_payload(payload: Value) -> Self {
        Self {
            app_payload: payload,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, kind: &str, ids: &[DbId]) -> Result<Value, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(CatalogError::ApiError {
                status: 500,
                body: "stub failure".to_string(),
            });
        }
        Ok(Value::Array(
            ids.iter()
                .map(|id| json!({ "id": id, "kind": kind, "state": "R" }))
                .collect(),
        ))
    }
}

#[async_trait]
impl CatalogSource for StubCatalog {
    async fn workouts_by_ids(&self, _lang: &str, ids: &[DbId]) -> Result<Value, CatalogError> {
        self.lookup("workout", ids)
    }

    async fn tags_by_ids(&self, _lang: &str, ids: &[DbId]) -> Result<Value, CatalogError> {
        self.lookup("tag", ids)
    }

    async fn app_plans(
        &self,
        _app: &str,
        _lang: &str,
        _state: PlanState,
    ) -> Result<Value, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.app_payload.clone())
    }
}

// ---------------------------------------------------------------------------
// App builders
// ---------------------------------------------------------------------------

/// Build the full application router with a default stub catalog.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, Arc::new(StubCatalog::default()))
}

/// Build the full application router around the given catalog.
///
/// Uses the same middleware stack as production via [`build_app_router`].
pub fn build_test_app_with(pool: PgPool, catalog: Arc<dyn CatalogSource>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        catalog,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// Read the full response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read the full response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A create/edit payload with one English name.
pub fn plan_payload(name: &str, workouts: &[DbId], tags: &[DbId]) -> Value {
    json!({
        "thumbnail": "plans/cover.png",
        "raw_name": name.to_lowercase().replace(' ', "-"),
        "type": "strength",
        "names": [
            { "name": name, "description": format!("{name} description"), "language": "en" }
        ],
        "tags": tags,
        "workouts": workouts,
    })
}

/// Create a plan through the API and return its id.
pub async fn create_plan(pool: &PgPool, body: Value) -> DbId {
    let response = post_json(build_test_app(pool.clone()), "/api/v1/plans", body).await;
    assert_eq!(response.status(), 200);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}
