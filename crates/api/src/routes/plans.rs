//! Route definitions for workout plans.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::plans;
use crate::state::AppState;

/// Plan routes mounted at `/plans`.
///
/// ```text
/// GET    /                  -> get_plans (lang, state, app?, like?)
/// POST   /                  -> create_plan
/// GET    /list              -> list_plans (from, limit, state?, lang?)
/// GET    /ids               -> get_plans_by_ids (ids, lang, state)
/// GET    /total             -> get_total
/// GET    /{id}              -> get_plan (lang, state)
/// PUT    /{id}              -> edit_plan
/// DELETE /{id}              -> delete_plan
/// POST   /{id}/release      -> release_plan
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(plans::get_plans).post(plans::create_plan))
        .route("/list", get(plans::list_plans))
        .route("/ids", get(plans::get_plans_by_ids))
        .route("/total", get(plans::get_total))
        .route(
            "/{id}",
            get(plans::get_plan)
                .put(plans::edit_plan)
                .delete(plans::delete_plan),
        )
        .route("/{id}/release", post(plans::release_plan))
}
