//! HTTP lookups against the workouts, tags and apps services.
//!
//! Workout and tag lookups always ask for the released view (`state=R`),
//! whatever the state of the plan being enriched.

use async_trait::async_trait;
use plans_core::plan::{join_ids, PlanState, APP_CONTENT_TYPE};
use plans_core::types::DbId;
use serde_json::Value;

use crate::config::CatalogConfig;

/// Errors from the catalog HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The HTTP request failed (network, DNS, timeout) or the body was not
    /// valid JSON.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Catalog service error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl CatalogError {
    /// Upstream HTTP status, when the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            CatalogError::Request(err) => err.status().map(|s| s.as_u16()),
            CatalogError::ApiError { status, .. } => Some(*status),
        }
    }
}

/// Resolves plan associations and app listings against the sibling services.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Released workouts for the given ids, as returned by the workouts service.
    async fn workouts_by_ids(&self, lang: &str, ids: &[DbId]) -> Result<Value, CatalogError>;

    /// Released tags for the given ids, as returned by the tags service.
    async fn tags_by_ids(&self, lang: &str, ids: &[DbId]) -> Result<Value, CatalogError>;

    /// Training plans attached to an app, passed through unchanged.
    async fn app_plans(&self, app: &str, lang: &str, state: PlanState)
        -> Result<Value, CatalogError>;
}

/// [`CatalogSource`] backed by HTTP calls.
pub struct CatalogClient {
    client: reqwest::Client,
    config: CatalogConfig,
}

impl CatalogClient {
    /// Create a client with its own connection pool and per-request timeout.
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: CatalogConfig) -> Self {
        Self { client, config }
    }

    /// `GET {base}/{resource}/ids?lang=..&state=R&ids=..`
    ///
    /// An empty id list resolves to an empty array without a request.
    async fn lookup_ids(
        &self,
        base: &str,
        resource: &str,
        lang: &str,
        ids: &[DbId],
    ) -> Result<Value, CatalogError> {
        if ids.is_empty() {
            return Ok(Value::Array(Vec::new()));
        }

        let ids_param = join_ids(ids);
        tracing::debug!(resource, lang, ids = %ids_param, "Catalog lookup");

        let response = self
            .client
            .get(format!("{base}/{resource}/ids"))
            .query(&[
                ("lang", lang),
                ("state", PlanState::Released.as_str()),
                ("ids", ids_param.as_str()),
            ])
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`CatalogError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, CatalogError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response(response: reqwest::Response) -> Result<Value, CatalogError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn workouts_by_ids(&self, lang: &str, ids: &[DbId]) -> Result<Value, CatalogError> {
        self.lookup_ids(&self.config.workouts_url, "workouts", lang, ids)
            .await
    }

    async fn tags_by_ids(&self, lang: &str, ids: &[DbId]) -> Result<Value, CatalogError> {
        self.lookup_ids(&self.config.tags_url, "tags", lang, ids).await
    }

    async fn app_plans(
        &self,
        app: &str,
        lang: &str,
        state: PlanState,
    ) -> Result<Value, CatalogError> {
        let response = self
            .client
            .get(format!("{}/apps/data", self.config.apps_url))
            .query(&[
                ("app", app),
                ("lang", lang),
                ("state", state.as_str()),
                ("type", APP_CONTENT_TYPE),
            ])
            .send()
            .await?;

        Self::parse_response(response).await
    }
}
