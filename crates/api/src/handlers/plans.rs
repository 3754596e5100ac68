//! Handlers for workout plans.
//!
//! Parameters are validated here; everything else is delegated to
//! [`PlanService`](crate::services::PlanService). Extractor rejections are
//! turned into the uniform JSON `400` through [`AppError`].

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use plans_core::plan::{non_blank, parse_id_list, validate_name_entry, validate_page};
use plans_core::types::DbId;
use plans_db::models::plan::PlanInput;

use crate::error::{AppError, AppResult};
use crate::query::{
    optional_state, required, required_int, required_lang, required_state, PlanFilterParams,
    PlanIdsParams, PlanListParams, PlanLookupParams,
};
use crate::services::dispatch::PlanFilter;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/plans/{id}?lang=&state=
pub async fn get_plan(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
    params: Result<Query<PlanLookupParams>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = path?;
    let Query(params) = params?;
    let lang = required_lang(&params.lang)?;
    let plan_state = required_state(&params.state)?;

    state.plans().get_plan(id, lang, plan_state).await
}

/// GET /api/v1/plans?lang=&state=&app=&like=
///
/// `app` takes precedence over `like`; without either, every plan in the
/// language and state is returned.
pub async fn get_plans(
    State(state): State<AppState>,
    params: Result<Query<PlanFilterParams>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = params?;
    let filter = PlanFilter {
        lang: required_lang(&params.lang)?,
        state: required_state(&params.state)?,
        app: non_blank(params.app.as_deref()),
        like: non_blank(params.like.as_deref()),
    };

    state.plans().get_plans(filter).await
}

/// GET /api/v1/plans/ids?ids=1,2,3&lang=&state=
pub async fn get_plans_by_ids(
    State(state): State<AppState>,
    params: Result<Query<PlanIdsParams>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = params?;
    let ids = parse_id_list(required(&params.ids, "ids")?)?;
    let lang = required_lang(&params.lang)?;
    let plan_state = required_state(&params.state)?;

    state.plans().get_plans_by_ids(&ids, lang, plan_state).await
}

/// GET /api/v1/plans/list?from=&limit=&state=&lang=
///
/// `limit` above `MAX_LIST_LIMIT` is a 400, never a shortened page.
pub async fn list_plans(
    State(state): State<AppState>,
    params: Result<Query<PlanListParams>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = params?;
    let from = required_int(params.from, "from")?;
    let limit = required_int(params.limit, "limit")?;
    validate_page(from, limit)?;
    let plan_state = optional_state(&params.state)?;
    let lang = non_blank(params.lang.as_deref());

    state.plans().list(from, limit, plan_state, lang).await
}

/// GET /api/v1/plans/total
pub async fn get_total(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    state.plans().total().await
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// POST /api/v1/plans
pub async fn create_plan(
    State(state): State<AppState>,
    payload: Result<Json<PlanInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;
    validate_input(&input)?;

    state.plans().create(&input).await
}

/// PUT /api/v1/plans/{id}
pub async fn edit_plan(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
    payload: Result<Json<PlanInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = path?;
    let Json(input) = payload?;
    validate_input(&input)?;

    state.plans().edit(id, &input).await
}

/// DELETE /api/v1/plans/{id}
///
/// Released plans are never deleted; that case answers 304.
pub async fn delete_plan(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = path?;
    state.plans().delete(id).await
}

/// POST /api/v1/plans/{id}/release
pub async fn release_plan(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = path?;
    state.plans().release(id).await
}

/// A submission needs at least one localized name and every name entry
/// must be usable.
fn validate_input(input: &PlanInput) -> AppResult<()> {
    if input.names.is_empty() {
        return Err(AppError::BadRequest(
            "At least one localized name is required".to_string(),
        ));
    }
    for entry in &input.names {
        validate_name_entry(&entry.name, &entry.language)?;
    }
    Ok(())
}
