use serde::{Deserialize, Serialize};

use super::audit::{AuditInfo, Identified};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: i64,
    pub name: String,
    pub code: String,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRegion {
    pub name: String,
    pub code: String,
}

impl Identified for Region {
    fn id(&self) -> i64 {
        self.id
    }
}
