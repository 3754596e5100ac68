//! Strategy selection for the filtered plan collection.
//!
//! Exactly one source runs per call, in priority order:
//!
//! 1. `app` set: the apps service, JSON passed through unchanged
//! 2. `like` set: [`PlanRepo::search`]
//! 3. otherwise: [`PlanRepo::list_by_state`]

use plans_catalog::CatalogSource;
use plans_core::plan::PlanState;
use plans_db::models::plan::PlanCollection;
use plans_db::repositories::PlanRepo;
use plans_db::DbPool;
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Filters of a collection request. Blank values must already be `None`.
#[derive(Debug, Clone, Copy)]
pub struct PlanFilter<'a> {
    pub lang: &'a str,
    pub state: PlanState,
    pub app: Option<&'a str>,
    pub like: Option<&'a str>,
}

/// Where a collection came from.
#[derive(Debug)]
pub enum PlanSource {
    /// Raw payload from the apps service.
    App(Value),
    /// Plans from the record store, still to be enriched.
    Plans(PlanCollection),
}

/// The strategy a filter selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy<'a> {
    ByApp(&'a str),
    Search(&'a str),
    ByState,
}

impl<'a> PlanFilter<'a> {
    pub fn strategy(&self) -> Strategy<'a> {
        match (self.app, self.like) {
            (Some(app), _) => Strategy::ByApp(app),
            (None, Some(term)) => Strategy::Search(term),
            (None, None) => Strategy::ByState,
        }
    }
}

/// Run the strategy selected by `filter`.
pub async fn dispatch(
    pool: &DbPool,
    catalog: &dyn CatalogSource,
    asset_base: &str,
    filter: PlanFilter<'_>,
) -> AppResult<PlanSource> {
    let source = match filter.strategy() {
        Strategy::ByApp(app) => {
            tracing::debug!(app, lang = filter.lang, "Plans by app");
            let payload = catalog
                .app_plans(app, filter.lang, filter.state)
                .await
                .map_err(AppError::catalog("get plans by app"))?;
            PlanSource::App(payload)
        }
        Strategy::Search(term) => {
            let plans = PlanRepo::search(pool, asset_base, filter.lang, filter.state, term)
                .await
                .map_err(AppError::store("search plans"))?;
            PlanSource::Plans(plans)
        }
        Strategy::ByState => {
            let plans = PlanRepo::list_by_state(pool, asset_base, filter.lang, filter.state)
                .await
                .map_err(AppError::store("get plans"))?;
            PlanSource::Plans(plans)
        }
    };
    Ok(source)
}
