use std::time::Duration;

use plans_catalog::CatalogConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Drain window after a shutdown signal, in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Prefix prepended to every rendered thumbnail path (default: empty).
    pub asset_base: String,
    /// Budget for one request's whole enrichment fan-out, in seconds (default: `10`).
    pub enrichment_timeout_secs: u64,
    /// Maximum number of plans enriched concurrently per request (default: `8`).
    pub enrichment_concurrency: usize,
    /// Sibling service endpoints.
    pub catalog: CatalogConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `3000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                       |
    /// | `ASSET_BASE_URL`          | (empty)                    |
    /// | `ENRICHMENT_TIMEOUT_SECS` | `10`                       |
    /// | `ENRICHMENT_CONCURRENCY`  | `8`                        |
    ///
    /// Catalog endpoints are read by [`CatalogConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let asset_base = std::env::var("ASSET_BASE_URL").unwrap_or_default();

        let enrichment_timeout_secs: u64 = std::env::var("ENRICHMENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("ENRICHMENT_TIMEOUT_SECS must be a valid u64");

        let enrichment_concurrency: usize = std::env::var("ENRICHMENT_CONCURRENCY")
            .unwrap_or_else(|_| "8".into())
            .parse()
            .expect("ENRICHMENT_CONCURRENCY must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            asset_base,
            enrichment_timeout_secs,
            enrichment_concurrency: enrichment_concurrency.max(1),
            catalog: CatalogConfig::from_env(),
        }
    }

    /// Enrichment budget as a [`Duration`].
    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_secs(self.enrichment_timeout_secs)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
