use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "SurgiFlow";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Insight page size when the caller does not ask for one.
pub const DEFAULT_INSIGHT_LIMIT: u32 = 50;

/// Default spacing between generation status polls.
pub const DEFAULT_INSIGHT_POLL_SECS: u64 = 5;

/// Default number of status polls before a refresh gives up.
pub const DEFAULT_INSIGHT_MAX_POLLS: u32 = 12;

/// Per-request timeout for calls to the insight generator.
pub const DEFAULT_GENERATOR_TIMEOUT_SECS: u64 = 30;

/// Get the application data directory
/// ~/SurgiFlow/ on all platforms, falling back to the working directory.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default database file inside the data directory.
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("surgiflow.db")
}

/// Log filter used when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "surgiflow=info,surgiflow_lib=info,tower_http=warn"
}

/// Runtime configuration read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    /// Base URL of the external insight generation function. `None` disables refresh.
    pub insights_url: Option<String>,
    pub insight_poll_interval: Duration,
    pub insight_max_polls: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

impl AppConfig {
    /// Read `SURGIFLOW_*` variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = lookup("SURGIFLOW_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: "SURGIFLOW_BIND",
            value: bind_raw.clone(),
        })?;

        let db_path = lookup("SURGIFLOW_DB")
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let insights_url = lookup("SURGIFLOW_INSIGHTS_URL")
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());

        let poll_secs = parse_or(&lookup, "SURGIFLOW_INSIGHT_POLL_SECS", DEFAULT_INSIGHT_POLL_SECS)?;
        let insight_max_polls = parse_or(&lookup, "SURGIFLOW_INSIGHT_MAX_POLLS", DEFAULT_INSIGHT_MAX_POLLS)?;

        Ok(Self {
            bind_addr,
            db_path,
            insights_url,
            insight_poll_interval: Duration::from_secs(poll_secs),
            insight_max_polls,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(default),
    }
}
