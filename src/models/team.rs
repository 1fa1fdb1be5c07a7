use serde::{Deserialize, Serialize};

use super::audit::{AuditInfo, Identified};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepTeam {
    pub id: i64,
    pub name: String,
    pub team_lead: Option<String>,
    pub region_id: Option<i64>,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepTeamPayload {
    pub name: String,
    pub team_lead: Option<String>,
    pub region_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Territory {
    pub id: i64,
    pub name: String,
    pub rep_team_id: Option<i64>,
    pub coverage_area: Option<String>,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritoryPayload {
    pub name: String,
    pub rep_team_id: Option<i64>,
    pub coverage_area: Option<String>,
}

impl Identified for RepTeam {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Territory {
    fn id(&self) -> i64 {
        self.id
    }
}
