//! Reference-data loader for selection controls.
//!
//! Each requested lookup runs on its own blocking thread and connection.
//! The group is awaited jointly: the first failure aborts the load and no
//! partial result is returned.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::task::JoinError;

use crate::db::{self, open_existing, DatabaseError};
use crate::models::{Hospital, Procedure, Region, Surgeon};

/// Which lookups a view needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRequest {
    #[serde(default)]
    pub regions: bool,
    #[serde(default)]
    pub hospitals: bool,
    #[serde(default)]
    pub surgeons: bool,
    #[serde(default)]
    pub procedures: bool,
}

impl ReferenceRequest {
    pub fn all() -> Self {
        Self { regions: true, hospitals: true, surgeons: true, procedures: true }
    }

    /// Lookups used by the booking form.
    pub fn booking() -> Self {
        Self { regions: false, hospitals: true, surgeons: true, procedures: true }
    }

    pub fn is_empty(&self) -> bool {
        !(self.regions || self.hospitals || self.surgeons || self.procedures)
    }
}

/// Active rows sorted by name. Lookups not requested stay empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferenceData {
    pub regions: Vec<Region>,
    pub hospitals: Vec<Hospital>,
    pub surgeons: Vec<Surgeon>,
    pub procedures: Vec<Procedure>,
}

#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("Failed to load {collection}: {source}")]
    Lookup {
        collection: &'static str,
        #[source]
        source: DatabaseError,
    },
    #[error("Lookup task for {collection} did not finish: {source}")]
    Task {
        collection: &'static str,
        #[source]
        source: JoinError,
    },
}

impl ReferenceError {
    pub fn collection(&self) -> &'static str {
        match self {
            ReferenceError::Lookup { collection, .. } | ReferenceError::Task { collection, .. } => collection,
        }
    }
}

async fn lookup<T, F>(
    db_path: &Path,
    collection: &'static str,
    wanted: bool,
    query: F,
) -> Result<Vec<T>, ReferenceError>
where
    T: Send + 'static,
    F: FnOnce(&rusqlite::Connection) -> Result<Vec<T>, DatabaseError> + Send + 'static,
{
    if !wanted {
        return Ok(Vec::new());
    }
    let path: PathBuf = db_path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let conn = open_existing(&path)?;
        query(&conn)
    })
    .await
    .map_err(|source| ReferenceError::Task { collection, source })?
    .map_err(|source| {
        tracing::warn!(collection, error = %source, "Reference lookup failed");
        ReferenceError::Lookup { collection, source }
    })
}

pub async fn load_reference_data(
    db_path: &Path,
    request: ReferenceRequest,
) -> Result<ReferenceData, ReferenceError> {
    let (regions, hospitals, surgeons, procedures) = tokio::try_join!(
        lookup(db_path, "regions", request.regions, db::list_active_regions),
        lookup(db_path, "hospitals", request.hospitals, db::list_active_hospitals),
        lookup(db_path, "surgeons", request.surgeons, db::list_active_surgeons),
        lookup(db_path, "procedures", request.procedures, db::list_active_procedures),
    )?;

    tracing::debug!(
        regions = regions.len(),
        hospitals = hospitals.len(),
        surgeons = surgeons.len(),
        procedures = procedures.len(),
        "Reference data loaded"
    );

    Ok(ReferenceData { regions, hospitals, surgeons, procedures })
}
