use std::sync::Arc;

use plans_catalog::CatalogSource;

use crate::config::ServerConfig;
use crate::services::PlanService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: plans_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Workouts, tags and apps lookups used for enrichment.
    pub catalog: Arc<dyn CatalogSource>,
}

impl AppState {
    /// Borrow the state as a [`PlanService`] for one request.
    pub fn plans(&self) -> PlanService<'_> {
        PlanService::new(&self.pool, self.catalog.as_ref(), &self.config)
    }
}
