use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Sibling services used for enrichment.
    pub catalog: CatalogEndpoints,
}

/// Base URLs the service was configured with. Reachability is not checked.
#[derive(Serialize)]
pub struct CatalogEndpoints {
    pub workouts: String,
    pub tags: String,
    pub apps: String,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = plans_db::health_check(&state.pool).await.is_ok();
    let catalog = &state.config.catalog;

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        catalog: CatalogEndpoints {
            workouts: catalog.workouts_url.clone(),
            tags: catalog.tags_url.clone(),
            apps: catalog.apps_url.clone(),
        },
    })
}

/// Root-level routes, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
