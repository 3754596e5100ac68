//! Plan aggregation: repository reads and writes, enrichment and the
//! status each outcome is reported with.

use plans_catalog::CatalogSource;
use plans_core::plan::{join_ids, PlanState};
use plans_core::types::DbId;
use plans_db::models::plan::{CollectionStatus, ListedPlan, Plan, PlanInput, VersionStamp};
use plans_db::repositories::PlanRepo;
use plans_db::DbPool;
use serde::Serialize;
use serde_json::Value;

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::response::Reply;
use crate::services::dispatch::{self, PlanFilter, PlanSource};
use crate::services::enrich::{self, Enrichment, FanOut};

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// A single plan with its workouts and tags resolved.
#[derive(Debug, Serialize)]
pub struct PlanDetail {
    pub id: DbId,
    pub thumbnail: String,
    pub name: String,
    pub raw_name: String,
    pub language: String,
    pub description: String,
    pub version: DbId,
    pub tags: Value,
    pub workouts: Value,
}

/// One item of an enriched plan collection.
///
/// `raw_name` and `ids` (the comma-joined workout ids) are only part of the
/// by-ids payload.
#[derive(Debug, Serialize)]
pub struct EnrichedPlan {
    pub id: DbId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_name: Option<String>,
    pub thumbnail: String,
    pub description: String,
    pub version: DbId,
    pub tags: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ids: Option<String>,
    pub workouts: Value,
}

impl EnrichedPlan {
    fn new(plan: Plan, enrichment: Enrichment) -> Self {
        Self {
            id: plan.id,
            name: plan.name,
            raw_name: None,
            thumbnail: plan.thumbnail,
            description: plan.description,
            version: plan.version,
            tags: enrichment.tags,
            ids: None,
            workouts: enrichment.workouts,
        }
    }

    fn with_identity(plan: Plan, enrichment: Enrichment) -> Self {
        let raw_name = plan.raw_name.clone();
        let ids = join_ids(&plan.workout_ids);
        Self {
            raw_name: Some(raw_name),
            ids: Some(ids),
            ..Self::new(plan, enrichment)
        }
    }
}

/// Payload of the filtered collection: enriched plans, or the apps
/// service's JSON untouched.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PlanListing {
    Plans(Vec<EnrichedPlan>),
    App(Value),
}

/// Identity of a deleted plan.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Deleted {
    pub id: DbId,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Per-request view over the shared state.
#[derive(Clone, Copy)]
pub struct PlanService<'a> {
    pool: &'a DbPool,
    catalog: &'a dyn CatalogSource,
    config: &'a ServerConfig,
}

impl<'a> PlanService<'a> {
    pub fn new(pool: &'a DbPool, catalog: &'a dyn CatalogSource, config: &'a ServerConfig) -> Self {
        Self {
            pool,
            catalog,
            config,
        }
    }

    fn fan_out(&self) -> FanOut {
        FanOut {
            concurrency: self.config.enrichment_concurrency,
            timeout: self.config.enrichment_timeout(),
        }
    }

    fn asset_base(&self) -> &str {
        &self.config.asset_base
    }

    /// One plan in `lang` and `state`, enriched. Missing plans are 204 and
    /// cost no catalog calls.
    pub async fn get_plan(
        &self,
        id: DbId,
        lang: &str,
        state: PlanState,
    ) -> AppResult<Reply<PlanDetail>> {
        let operation = "get plan";
        let Some(plan) = PlanRepo::find_by_id(self.pool, self.asset_base(), id, lang, state)
            .await
            .map_err(AppError::store(operation))?
        else {
            return Ok(Reply::NoContent);
        };

        let fan_out = self.fan_out();
        let enrichment = tokio::time::timeout(
            fan_out.timeout,
            enrich::enrich_plan(self.catalog, lang, &plan),
        )
        .await
        .map_err(|_| AppError::UpstreamTimeout(operation))?
        .map_err(AppError::catalog(operation))?;

        Ok(Reply::Data(PlanDetail {
            id: plan.id,
            thumbnail: plan.thumbnail,
            name: plan.name,
            raw_name: plan.raw_name,
            language: plan.language,
            description: plan.description,
            version: plan.version,
            tags: enrichment.tags,
            workouts: enrichment.workouts,
        }))
    }

    /// The filtered collection. App results pass through; store results are
    /// enriched. An empty result of either kind is 204.
    pub async fn get_plans(&self, filter: PlanFilter<'_>) -> AppResult<Reply<PlanListing>> {
        let operation = "get plans";
        let source = dispatch::dispatch(self.pool, self.catalog, self.asset_base(), filter).await?;

        match source {
            PlanSource::App(payload) => {
                if is_empty_payload(&payload) {
                    return Ok(Reply::NoContent);
                }
                Ok(Reply::Data(PlanListing::App(payload)))
            }
            PlanSource::Plans(collection) => {
                if collection.status() == CollectionStatus::Empty {
                    return Ok(Reply::NoContent);
                }
                let plans = collection.into_plans();
                let enrichments =
                    enrich::enrich_all(self.catalog, filter.lang, &plans, self.fan_out(), operation)
                        .await?;
                let items = plans
                    .into_iter()
                    .zip(enrichments)
                    .map(|(plan, enrichment)| EnrichedPlan::new(plan, enrichment))
                    .collect();
                Ok(Reply::Data(PlanListing::Plans(items)))
            }
        }
    }

    /// Plans from an explicit id list, enriched. Unknown ids are skipped;
    /// the status follows the collection the store returned.
    pub async fn get_plans_by_ids(
        &self,
        ids: &[DbId],
        lang: &str,
        state: PlanState,
    ) -> AppResult<Reply<Vec<EnrichedPlan>>> {
        let operation = "get plans by ids";
        let collection = PlanRepo::list_by_ids(self.pool, self.asset_base(), ids, lang, state)
            .await
            .map_err(AppError::store(operation))?;

        if collection.status() == CollectionStatus::Empty {
            return Ok(Reply::NoContent);
        }

        let plans = collection.into_plans();
        let enrichments =
            enrich::enrich_all(self.catalog, lang, &plans, self.fan_out(), operation).await?;

        Ok(Reply::Data(
            plans
                .into_iter()
                .zip(enrichments)
                .map(|(plan, enrichment)| EnrichedPlan::with_identity(plan, enrichment))
                .collect(),
        ))
    }

    /// Paginated listing without enrichment.
    pub async fn list(
        &self,
        from: i64,
        limit: i64,
        state: Option<PlanState>,
        lang: Option<&str>,
    ) -> AppResult<Reply<Vec<ListedPlan>>> {
        let rows = PlanRepo::list(self.pool, self.asset_base(), from, limit, state, lang)
            .await
            .map_err(AppError::store("list plans"))?;
        Ok(Reply::collection(rows))
    }

    /// Number of plans as a one-element list; no plans is 204.
    pub async fn total(&self) -> AppResult<Reply<Vec<i64>>> {
        let total = PlanRepo::count(self.pool)
            .await
            .map_err(AppError::store("count plans"))?;
        Ok(Reply::found((total > 0).then(|| vec![total])))
    }

    pub async fn create(&self, input: &PlanInput) -> AppResult<Reply<VersionStamp>> {
        let stamp = PlanRepo::create(self.pool, input)
            .await
            .map_err(AppError::store("create plan"))?;
        tracing::info!(plan_id = stamp.id, version = stamp.version, "Plan created");
        Ok(Reply::Data(stamp))
    }

    pub async fn edit(&self, id: DbId, input: &PlanInput) -> AppResult<Reply<VersionStamp>> {
        let outcome = PlanRepo::edit(self.pool, id, input)
            .await
            .map_err(AppError::store("edit plan"))?;
        if let Some(stamp) = outcome {
            tracing::info!(plan_id = stamp.id, version = stamp.version, "Plan edited");
        }
        Ok(Reply::modified(outcome))
    }

    pub async fn delete(&self, id: DbId) -> AppResult<Reply<Deleted>> {
        let deleted = PlanRepo::delete(self.pool, id)
            .await
            .map_err(AppError::store("delete plan"))?;
        if deleted {
            tracing::info!(plan_id = id, "Plan deleted");
        }
        Ok(Reply::modified(deleted.then_some(Deleted { id })))
    }

    pub async fn release(&self, id: DbId) -> AppResult<Reply<VersionStamp>> {
        let outcome = PlanRepo::release(self.pool, id)
            .await
            .map_err(AppError::store("release plan"))?;
        if let Some(stamp) = outcome {
            tracing::info!(plan_id = stamp.id, version = stamp.version, "Plan released");
        }
        Ok(Reply::modified(outcome))
    }
}

/// Apps payloads count as empty when they are `null`, `[]` or `{}`.
fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}
