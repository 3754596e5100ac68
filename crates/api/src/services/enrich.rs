//! Resolution of plan workout and tag ids against the catalog services.
//!
//! Each plan needs two lookups, which run concurrently. Collections are
//! enriched with bounded concurrency; results come back in input order and
//! every plan runs to completion before the first failure is reported.
//! The whole fan-out shares one timeout.

use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::{self, StreamExt};
use plans_catalog::{CatalogError, CatalogSource};
use plans_db::models::plan::Plan;
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Resolved associations of one plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    pub workouts: Value,
    pub tags: Value,
}

/// Limits applied to one request's fan-out.
#[derive(Debug, Clone, Copy)]
pub struct FanOut {
    pub concurrency: usize,
    pub timeout: Duration,
}

/// Look up the released workouts and tags of a single plan.
pub async fn enrich_plan(
    catalog: &dyn CatalogSource,
    lang: &str,
    plan: &Plan,
) -> Result<Enrichment, CatalogError> {
    let (workouts, tags) = tokio::join!(
        catalog.workouts_by_ids(lang, &plan.workout_ids),
        catalog.tags_by_ids(lang, &plan.tag_ids),
    );
    Ok(Enrichment {
        workouts: workouts?,
        tags: tags?,
    })
}

/// Enrich every plan, returning one [`Enrichment`] per plan in input order.
///
/// Fails with [`AppError::UpstreamTimeout`] if the fan-out exceeds its
/// budget (outstanding lookups are dropped) and with [`AppError::Catalog`]
/// if any single lookup failed.
pub async fn enrich_all(
    catalog: &dyn CatalogSource,
    lang: &str,
    plans: &[Plan],
    limits: FanOut,
    operation: &'static str,
) -> AppResult<Vec<Enrichment>> {
    if plans.is_empty() {
        return Ok(Vec::new());
    }

    // Boxed up front so the handler future stays `Send` for every lifetime.
    let lookups: Vec<BoxFuture<'_, Result<Enrichment, CatalogError>>> = plans
        .iter()
        .map(|plan| Box::pin(enrich_plan(catalog, lang, plan)) as _)
        .collect();

    let fan_out = stream::iter(lookups)
        .buffered(limits.concurrency.max(1))
        .collect::<Vec<_>>();

    let results = tokio::time::timeout(limits.timeout, fan_out)
        .await
        .map_err(|_| AppError::UpstreamTimeout(operation))?;

    results
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .map_err(AppError::catalog(operation))
}
