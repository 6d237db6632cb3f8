use std::time::Duration;

use askbox_search::DEFAULT_INDEX;
use askbox_worker::ExportConfig;

use crate::auth::jwt::JwtConfig;

/// Which [`askbox_db::ContentStore`] / [`askbox_db::JobQueue`] pair to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL via `DATABASE_URL`.
    Postgres,
    /// Everything in process. Data is lost on restart.
    Memory,
}

impl StoreBackend {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" => Self::Memory,
            "postgres" | "postgresql" => Self::Postgres,
            other => panic!("STORE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        }
    }
}

/// Search engine settings.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Elasticsearch base URL. `None` selects the in-process index.
    pub url: Option<String>,
    pub index: String,
    pub timeout: Duration,
    /// Interval of the reconciliation pass. `None` disables it.
    pub reconcile_interval: Option<Duration>,
}

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
    /// Time allowed for background tasks to stop after shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    pub store_backend: StoreBackend,
    pub search: SearchSettings,
    /// Artifact directory, job timeout and poll interval for export jobs.
    pub export: ExportConfig,
    /// Finished export jobs older than this are purged with their artifacts.
    pub export_retention_hours: i64,
    /// Run an export worker inside the API process.
    pub embedded_worker: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                 |
    /// |----------------------------------|-------------------------|
    /// | `HOST`                           | `0.0.0.0`               |
    /// | `PORT`                           | `3000`                  |
    /// | `CORS_ORIGINS`                   | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`          | `30`                    |
    /// | `STORE_BACKEND`                  | `postgres`              |
    /// | `SEARCH_URL`                     | unset (in-process)      |
    /// | `SEARCH_INDEX`                   | `input_data`            |
    /// | `SEARCH_TIMEOUT_SECS`            | `5`                     |
    /// | `SEARCH_RECONCILE_INTERVAL_SECS` | `600` (`0` disables)    |
    /// | `EXPORT_RETENTION_HOURS`         | `24`                    |
    /// | `EMBEDDED_WORKER`                | `false`                 |
    ///
    /// Export variables are read by [`ExportConfig::from_env`] and JWT
    /// variables by [`JwtConfig::from_env`]. The memory backend always runs
    /// the embedded worker, since no other process can see its queue.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let store_backend = StoreBackend::parse(
            &std::env::var("STORE_BACKEND").unwrap_or_else(|_| "postgres".into()),
        );

        let search_timeout_secs: u64 = std::env::var("SEARCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("SEARCH_TIMEOUT_SECS must be a valid u64");

        let reconcile_secs: u64 = std::env::var("SEARCH_RECONCILE_INTERVAL_SECS")
            .unwrap_or_else(|_| "600".into())
            .parse()
            .expect("SEARCH_RECONCILE_INTERVAL_SECS must be a valid u64");

        let search = SearchSettings {
            url: std::env::var("SEARCH_URL").ok().filter(|s| !s.trim().is_empty()),
            index: std::env::var("SEARCH_INDEX").unwrap_or_else(|_| DEFAULT_INDEX.into()),
            timeout: Duration::from_secs(search_timeout_secs),
            reconcile_interval: (reconcile_secs > 0).then(|| Duration::from_secs(reconcile_secs)),
        };

        let export_retention_hours: i64 = std::env::var("EXPORT_RETENTION_HOURS")
            .unwrap_or_else(|_| "24".into())
            .parse()
            .expect("EXPORT_RETENTION_HOURS must be a valid i64");

        let embedded_worker = store_backend == StoreBackend::Memory
            || std::env::var("EMBEDDED_WORKER")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            store_backend,
            search,
            export: ExportConfig::from_env(),
            export_retention_hours,
            embedded_worker,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_backend_parses_known_values() {
        assert_eq!(StoreBackend::parse("memory"), StoreBackend::Memory);
        assert_eq!(StoreBackend::parse(" Postgres "), StoreBackend::Postgres);
    }

    #[test]
    #[should_panic(expected = "STORE_BACKEND")]
    fn store_backend_rejects_unknown_values() {
        StoreBackend::parse("sqlite");
    }
}
