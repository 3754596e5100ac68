use std::time::Duration;

/// Base URLs of the sibling services, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Workouts service base URL (default: `http://workouts:8888`).
    pub workouts_url: String,
    /// Tags service base URL (default: `http://tags:8888`).
    pub tags_url: String,
    /// Apps service base URL (default: `http://apps:8888`).
    pub apps_url: String,
    /// Timeout for a single outbound request (default: 10 s).
    pub request_timeout: Duration,
}

impl CatalogConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                |
    /// |-----------------------------|------------------------|
    /// | `WORKOUTS_SERVICE_URL`      | `http://workouts:8888` |
    /// | `TAGS_SERVICE_URL`          | `http://tags:8888`     |
    /// | `APPS_SERVICE_URL`          | `http://apps:8888`     |
    /// | `CATALOG_HTTP_TIMEOUT_SECS` | `10`                   |
    pub fn from_env() -> Self {
        let workouts_url = base_url("WORKOUTS_SERVICE_URL", "http://workouts:8888");
        let tags_url = base_url("TAGS_SERVICE_URL", "http://tags:8888");
        let apps_url = base_url("APPS_SERVICE_URL", "http://apps:8888");

        let timeout_secs: u64 = std::env::var("CATALOG_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("CATALOG_HTTP_TIMEOUT_SECS must be a valid u64");

        Self {
            workouts_url,
            tags_url,
            apps_url,
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

fn base_url(var: &str, default: &str) -> String {
    let value = std::env::var(var).unwrap_or_else(|_| default.into());
    value.trim_end_matches('/').to_string()
}
