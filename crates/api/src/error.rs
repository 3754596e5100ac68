use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use plans_catalog::CatalogError;
use plans_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Library crates return plain results; this is the single place where
/// their failures are logged and turned into status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `plans_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Missing or malformed request input.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The record store failed while running `operation`.
    #[error("Database error during {operation}: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// A sibling service call failed or returned malformed JSON.
    #[error("Catalog error during {operation}: {source}")]
    Catalog {
        operation: &'static str,
        #[source]
        source: CatalogError,
    },

    /// The enrichment fan-out did not finish within its budget.
    #[error("Upstream timeout during {0}")]
    UpstreamTimeout(&'static str),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Map a store error, labelled with the operation that produced it.
    ///
    /// ```ignore
    /// PlanRepo::count(&pool).await.map_err(AppError::store("count plans"))?;
    /// ```
    pub fn store(operation: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
        move |source| AppError::Store { operation, source }
    }

    /// Map a catalog error, labelled with the operation that produced it.
    pub fn catalog(operation: &'static str) -> impl FnOnce(CatalogError) -> AppError {
        move |source| AppError::Catalog { operation, source }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(CoreError::Validation(msg)) => {
                tracing::warn!(error = %msg, "Rejected request");
                (
                    StatusCode::BAD_REQUEST,
                    "BAD_REQUEST",
                    format!("Bad request: {msg}"),
                )
            }
            AppError::BadRequest(msg) => {
                tracing::warn!(error = %msg, "Rejected request");
                (
                    StatusCode::BAD_REQUEST,
                    "BAD_REQUEST",
                    format!("Bad request: {msg}"),
                )
            }
            AppError::Store { operation, source } => {
                let code = sqlstate(source);
                tracing::error!(operation, code = code.as_deref().unwrap_or("-"), error = %source, "Store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal error".to_string(),
                )
            }
            AppError::Catalog { operation, source } => {
                tracing::error!(operation, code = source.status(), error = %source, "Enrichment failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "Invalid data".to_string(),
                )
            }
            AppError::UpstreamTimeout(operation) => {
                tracing::error!(operation, "Enrichment timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "UPSTREAM_TIMEOUT",
                    "Upstream timeout".to_string(),
                )
            }
        };

        let body = json!({
            "status": status.as_u16(),
            "message": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// PostgreSQL SQLSTATE of a database error, if the server produced one.
fn sqlstate(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    }
}
