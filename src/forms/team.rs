//! Rep team and territory forms.

use rusqlite::Connection;

use super::convert::{opt_int, put_num, put_opt, required_text, text};
use super::{EntityForm, FormError, FormFields};
use crate::db::{self, DatabaseError, Table};
use crate::models::{RepTeam, RepTeamPayload, Territory, TerritoryPayload};

#[derive(Debug)]
pub struct RepTeamForm;

impl EntityForm for RepTeamForm {
    type Row = RepTeam;
    type Payload = RepTeamPayload;

    const TABLE: Table = Table::RepTeams;
    const REQUIRED: &'static [&'static str] = &["name"];

    fn defaults() -> FormFields {
        ["name", "team_lead", "region_id"]
            .iter()
            .map(|name| (name.to_string(), String::new()))
            .collect()
    }

    fn fields_from_row(row: &RepTeam) -> FormFields {
        let mut fields = Self::defaults();
        put_opt(&mut fields, "name", Some(&row.name));
        put_opt(&mut fields, "team_lead", row.team_lead.as_deref());
        put_num(&mut fields, "region_id", row.region_id);
        fields
    }

    fn payload_from_fields(fields: &FormFields) -> Result<RepTeamPayload, FormError> {
        Ok(RepTeamPayload {
            name: required_text(fields, "name")?,
            team_lead: text(fields, "team_lead"),
            region_id: opt_int(fields, "region_id")?,
        })
    }

    fn create(conn: &Connection, payload: &RepTeamPayload, actor: &str) -> Result<RepTeam, DatabaseError> {
        db::insert_rep_team(conn, payload, actor)
    }

    fn update(conn: &Connection, id: i64, payload: &RepTeamPayload, actor: &str) -> Result<(), DatabaseError> {
        db::update_rep_team(conn, id, payload, actor)
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Option<RepTeam>, DatabaseError> {
        Ok(db::get_rep_team(conn, id)?.filter(|t| t.audit.is_active))
    }

    fn reload(conn: &Connection) -> Result<Vec<RepTeam>, DatabaseError> {
        db::list_active_rep_teams(conn)
    }
}

#[derive(Debug)]
pub struct TerritoryForm;

impl EntityForm for TerritoryForm {
    type Row = Territory;
    type Payload = TerritoryPayload;

    const TABLE: Table = Table::Territories;
    const REQUIRED: &'static [&'static str] = &["name"];

    fn defaults() -> FormFields {
        ["name", "rep_team_id", "coverage_area"]
            .iter()
            .map(|name| (name.to_string(), String::new()))
            .collect()
    }

    fn fields_from_row(row: &Territory) -> FormFields {
        let mut fields = Self::defaults();
        put_opt(&mut fields, "name", Some(&row.name));
        put_num(&mut fields, "rep_team_id", row.rep_team_id);
        put_opt(&mut fields, "coverage_area", row.coverage_area.as_deref());
        fields
    }

    fn payload_from_fields(fields: &FormFields) -> Result<TerritoryPayload, FormError> {
        Ok(TerritoryPayload {
            name: required_text(fields, "name")?,
            rep_team_id: opt_int(fields, "rep_team_id")?,
            coverage_area: text(fields, "coverage_area"),
        })
    }

    fn create(conn: &Connection, payload: &TerritoryPayload, actor: &str) -> Result<Territory, DatabaseError> {
        db::insert_territory(conn, payload, actor)
    }

    fn update(conn: &Connection, id: i64, payload: &TerritoryPayload, actor: &str) -> Result<(), DatabaseError> {
        db::update_territory(conn, id, payload, actor)
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Option<Territory>, DatabaseError> {
        Ok(db::get_territory(conn, id)?.filter(|t| t.audit.is_active))
    }

    fn reload(conn: &Connection) -> Result<Vec<Territory>, DatabaseError> {
        db::list_active_territories(conn)
    }
}
