pub mod health;
pub mod plans;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /plans                          filtered collection, create
/// /plans/list                     paginated listing
/// /plans/ids                      collection by explicit ids
/// /plans/total                    number of plans
/// /plans/{id}                     get, edit, delete
/// /plans/{id}/release             release (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/plans", plans::router())
}
