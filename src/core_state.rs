//! Application state shared by every request handler.
//!
//! Built once at startup: the database is migrated, report capabilities are
//! detected, and the insight generator client is created if one is configured.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::capabilities::ReportCapabilities;
use crate::config::{self, AppConfig};
use crate::db;
use crate::insights::{HttpInsightGenerator, InsightError, InsightGenerator, RefreshPolicy};

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    db_path: PathBuf,
    /// Fixed for the lifetime of the process.
    pub capabilities: ReportCapabilities,
    generator: Option<Arc<dyn InsightGenerator>>,
    pub refresh_policy: RefreshPolicy,
    pub insight_limit: u32,
}

impl CoreState {
    pub fn initialize(config: &AppConfig) -> Result<Self, CoreError> {
        if let Some(parent) = config.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::DataDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let conn = db::open_database(&config.db_path)?;
        let capabilities = ReportCapabilities::detect(&conn)?;

        let generator: Option<Arc<dyn InsightGenerator>> = match &config.insights_url {
            Some(url) => Some(Arc::new(HttpInsightGenerator::new(
                url,
                config::DEFAULT_GENERATOR_TIMEOUT_SECS,
            )?)),
            None => {
                tracing::info!("No insight generator configured, refresh disabled");
                None
            }
        };

        tracing::info!(db = %config.db_path.display(), "Core state initialized");

        Ok(Self {
            db_path: config.db_path.clone(),
            capabilities,
            generator,
            refresh_policy: RefreshPolicy {
                interval: config.insight_poll_interval,
                max_polls: config.insight_max_polls,
            },
            insight_limit: config::DEFAULT_INSIGHT_LIMIT,
        })
    }

    /// Replace the generator (tests, alternate transports).
    pub fn with_generator(mut self, generator: Arc<dyn InsightGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }

    /// Open a connection for one unit of work.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        db::open_database(&self.db_path).map_err(CoreError::Database)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn generator(&self) -> Option<Arc<dyn InsightGenerator>> {
        self.generator.clone()
    }
}

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Cannot create data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Insight generator setup failed: {0}")]
    Generator(#[from] InsightError),
}
