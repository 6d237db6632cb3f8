use std::path::PathBuf;
use std::time::Duration;

/// Export worker configuration loaded from environment variables.
///
/// | Env var                     | Default     |
/// |-----------------------------|-------------|
/// | `EXPORT_DIR`                | `./exports` |
/// | `EXPORT_JOB_TIMEOUT_SECS`   | `60`        |
/// | `EXPORT_POLL_INTERVAL_MS`   | `1000`      |
/// | `EXPORT_ABANDON_GRACE_SECS` | `30`        |
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Directory artifacts are written to. Shared with the API process.
    pub export_dir: PathBuf,
    /// Upper bound on one export run. A run that exceeds it fails the job.
    pub job_timeout: Duration,
    /// Delay between queue polls when the queue is empty.
    pub poll_interval: Duration,
    /// Extra time past `job_timeout` before a `Running` job counts as
    /// abandoned by a crashed worker and is failed.
    pub abandon_grace: Duration,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            export_dir: PathBuf::from("./exports"),
            job_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_millis(1000),
            abandon_grace: Duration::from_secs(30),
        }
    }
}

impl ExportConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let export_dir = std::env::var("EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.export_dir);

        let job_timeout = std::env::var("EXPORT_JOB_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.job_timeout);

        let poll_interval = std::env::var("EXPORT_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);

        let abandon_grace = std::env::var("EXPORT_ABANDON_GRACE_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.abandon_grace);

        Self {
            export_dir,
            job_timeout,
            poll_interval,
            abandon_grace,
        }
    }
}
