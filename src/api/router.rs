//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`. Layers (outermost first): CORS, then
//! the access logger.

use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints::{self, forms};
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;
use crate::forms::{BookingForm, HospitalForm, HospitalSystemForm, RepTeamForm, TerritoryForm};

/// Build the API router.
///
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
/// Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/reference", get(endpoints::reference::load))
        // Catalog
        .route(
            "/regions",
            get(endpoints::catalog::list_regions).post(endpoints::catalog::create_region),
        )
        .route(
            "/surgeons",
            get(endpoints::catalog::list_surgeons).post(endpoints::catalog::create_surgeon),
        )
        .route(
            "/procedures",
            get(endpoints::catalog::list_procedures).post(endpoints::catalog::create_procedure),
        )
        // Organizations
        .route(
            "/hospital-systems",
            get(endpoints::organization::hierarchy).post(forms::create::<HospitalSystemForm>),
        )
        .route("/hospital-systems/new", get(forms::defaults::<HospitalSystemForm>))
        .route(
            "/hospital-systems/:id",
            get(forms::detail::<HospitalSystemForm>)
                .put(forms::update::<HospitalSystemForm>)
                .delete(forms::delete::<HospitalSystemForm>),
        )
        .route(
            "/hospitals",
            get(endpoints::organization::list_hospitals).post(forms::create::<HospitalForm>),
        )
        .route("/hospitals/new", get(forms::defaults::<HospitalForm>))
        .route(
            "/hospitals/:id",
            get(forms::detail::<HospitalForm>)
                .put(forms::update::<HospitalForm>)
                .delete(forms::delete::<HospitalForm>),
        )
        // Teams
        .route(
            "/rep-teams",
            get(endpoints::teams::hierarchy).post(forms::create::<RepTeamForm>),
        )
        .route("/rep-teams/new", get(forms::defaults::<RepTeamForm>))
        .route(
            "/rep-teams/:id",
            get(forms::detail::<RepTeamForm>)
                .put(forms::update::<RepTeamForm>)
                .delete(forms::delete::<RepTeamForm>),
        )
        .route(
            "/territories",
            get(endpoints::teams::list_territories).post(forms::create::<TerritoryForm>),
        )
        .route("/territories/new", get(forms::defaults::<TerritoryForm>))
        .route(
            "/territories/:id",
            get(forms::detail::<TerritoryForm>)
                .put(forms::update::<TerritoryForm>)
                .delete(forms::delete::<TerritoryForm>),
        )
        // Bookings
        .route(
            "/cases",
            get(endpoints::cases::list).post(forms::create::<BookingForm>),
        )
        .route("/cases/new", get(forms::defaults::<BookingForm>))
        .route("/cases/stats", get(endpoints::cases::stats))
        .route(
            "/cases/:id",
            get(forms::detail::<BookingForm>)
                .put(forms::update::<BookingForm>)
                .delete(forms::delete::<BookingForm>),
        )
        .route("/cases/:id/status", post(endpoints::cases::change_status))
        .route("/schedule", get(endpoints::cases::schedule))
        // Insights and reports
        .route("/insights", get(endpoints::insights::list))
        .route("/insights/refresh", post(endpoints::insights::refresh))
        .route("/insights/:id/viewed", post(endpoints::insights::mark_viewed))
        .route("/reports/sales", get(endpoints::reports::sales))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access));

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new().nest("/api", api).layer(cors)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::{self, AppConfig};
    use crate::db::repository::fixtures::{seed_reference, Seeded};
    use crate::db::{self, Table};
    use crate::insights::{GenerationStatus, GenerationTicket, InsightError, InsightGenerator, RefreshPolicy};
    use crate::models::enums::InsightCategory;
    use crate::models::NewInsight;

    fn test_config(dir: &Path) -> AppConfig {
        AppConfig {
            bind_addr: config::DEFAULT_BIND_ADDR.parse().unwrap(),
            db_path: dir.join("api.db"),
            insights_url: None,
            insight_poll_interval: Duration::from_millis(1),
            insight_max_polls: 3,
        }
    }

    /// Core state on a temp database with the reference rows seeded.
    /// The tempdir guard must be kept alive for the duration of the test.
    fn test_core() -> (CoreState, Seeded, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let core = CoreState::initialize(&test_config(tmp.path())).unwrap();
        let seeded = seed_reference(&core.open_db().unwrap());
        (core, seeded, tmp)
    }

    fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("X-Actor", "jlee");
        match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn booking_fields(seeded: &Seeded) -> Value {
        json!({
            "surgeon_id": seeded.surgeon.id.to_string(),
            "hospital_id": seeded.hospital.id.to_string(),
            "procedure_id": seeded.procedure.id.to_string(),
            "scheduled_date": "2031-03-04",
            "scheduled_time": "08:30",
            "operating_room": "OR-1",
            "estimated_cost": "4200.50"
        })
    }

    #[tokio::test]
    async fn health_reports_capabilities() {
        let (core, _seeded, _tmp) = test_core();
        let app = api_router(Arc::new(core));

        let (status, json) = send(&app, request("GET", "/api/health", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["capabilities"]["invoices"], true);
        assert_eq!(json["insights_configured"], false);
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let (core, _seeded, _tmp) = test_core();
        let app = api_router(Arc::new(core));
        let (status, _) = send(&app, request("GET", "/api/nonexistent", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reference_without_flags_loads_everything() {
        let (core, _seeded, _tmp) = test_core();
        let app = api_router(Arc::new(core));

        let (status, json) = send(&app, request("GET", "/api/reference", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["hospitals"].as_array().unwrap().len(), 1);
        assert_eq!(json["surgeons"].as_array().unwrap().len(), 1);
        assert_eq!(json["procedures"].as_array().unwrap().len(), 1);
        assert_eq!(json["regions"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reference_loads_only_requested_lookups() {
        let (core, _seeded, _tmp) = test_core();
        let app = api_router(Arc::new(core));

        let (status, json) = send(&app, request("GET", "/api/reference?surgeons=true", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["surgeons"].as_array().unwrap().len(), 1);
        assert!(json["hospitals"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reference_failure_names_the_collection() {
        let (core, _seeded, _tmp) = test_core();
        core.open_db()
            .unwrap()
            .execute_batch("ALTER TABLE surgeons RENAME TO surgeons_old;")
            .unwrap();
        let app = api_router(Arc::new(core));

        let (status, json) = send(&app, request("GET", "/api/reference", None)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(json["error"]["message"].as_str().unwrap().contains("surgeons"));
        assert!(json.get("hospitals").is_none());
    }

    #[tokio::test]
    async fn create_with_blank_required_field_persists_nothing() {
        let (core, _seeded, _tmp) = test_core();
        let core = Arc::new(core);
        let app = api_router(core.clone());

        let (status, json) = send(
            &app,
            request("POST", "/api/hospital-systems", Some(json!({ "name": "  " }))),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["message"], crate::forms::MISSING_REQUIRED_MESSAGE);
        assert!(db::list_active_hospital_systems(&core.open_db().unwrap()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn hospital_lifecycle_and_hierarchy() {
        let (core, seeded, _tmp) = test_core();
        let app = api_router(Arc::new(core));

        let (status, system) = send(
            &app,
            request(
                "POST",
                "/api/hospital-systems",
                Some(json!({ "name": "Cascade Health", "city": "Portland" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(system["created_by"], "jlee");
        assert_eq!(system["address"]["city"], "Portland");
        assert!(system["contact_info"].is_null());
        let system_id = system["id"].as_i64().unwrap();

        let (status, hospital) = send(
            &app,
            request(
                "POST",
                "/api/hospitals",
                Some(json!({ "name": "Cascade North", "hospital_system_id": system_id.to_string() })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let hospital_id = hospital["id"].as_i64().unwrap();

        // Parent, its child, separator, then the seeded independent hospital.
        let (_, rows) = send(&app, request("GET", "/api/hospital-systems", None)).await;
        let kinds: Vec<&str> = rows
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["kind"].as_str().unwrap())
            .collect();
        assert_eq!(kinds, ["parent", "child", "separator", "independent"]);
        assert_eq!(rows[3]["row"]["id"], seeded.hospital.id);

        let (status, view) = send(&app, request("GET", &format!("/api/hospitals/{hospital_id}"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["mode"]["mode"], "view");
        assert_eq!(view["fields"]["name"], "Cascade North");

        let (status, updated) = send(
            &app,
            request(
                "PUT",
                &format!("/api/hospitals/{hospital_id}"),
                Some(json!({ "name": "Cascade North Campus", "bed_count": "220" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["bed_count"], 220);
        assert!(updated["hospital_system_id"].is_null());

        let (status, _) = send(&app, request("DELETE", &format!("/api/hospitals/{hospital_id}"), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, request("DELETE", &format!("/api/hospitals/{hospital_id}"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, json) = send(&app, request("GET", &format!("/api/hospitals/{hospital_id}"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn new_booking_form_starts_scheduled() {
        let (core, _seeded, _tmp) = test_core();
        let app = api_router(Arc::new(core));

        let (status, view) = send(&app, request("GET", "/api/cases/new", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["mode"]["mode"], "create");
        assert_eq!(view["fields"]["status"], "scheduled");
        assert_eq!(view["fields"]["surgeon_id"], "");
        assert!(view["row"].is_null());
    }

    #[tokio::test]
    async fn deleted_case_detail_is_not_found() {
        let (core, seeded, _tmp) = test_core();
        let app = api_router(Arc::new(core));
        let (_, case) = send(&app, request("POST", "/api/cases", Some(booking_fields(&seeded)))).await;
        let id = case["id"].as_i64().unwrap();

        let (status, _) = send(&app, request("GET", &format!("/api/cases/{id}"), None)).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, request("DELETE", &format!("/api/cases/{id}"), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, request("GET", &format!("/api/cases/{id}"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(
            &app,
            request("PUT", &format!("/api/cases/{id}"), Some(booking_fields(&seeded))),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn territories_without_team_follow_separator() {
        let (core, _seeded, _tmp) = test_core();
        let app = api_router(Arc::new(core));

        let (_, team) = send(
            &app,
            request("POST", "/api/rep-teams", Some(json!({ "name": "West", "team_lead": "Ana" }))),
        )
        .await;
        let team_id = team["id"].as_i64().unwrap().to_string();
        send(
            &app,
            request("POST", "/api/territories", Some(json!({ "name": "Coast", "rep_team_id": team_id }))),
        )
        .await;
        send(&app, request("POST", "/api/territories", Some(json!({ "name": "Inland" })))).await;

        let (status, rows) = send(&app, request("GET", "/api/rep-teams", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(rows[2]["kind"], "separator");
        assert_eq!(rows[2]["label"], endpoints::teams::UNASSIGNED_TERRITORIES);
        assert_eq!(rows[3]["row"]["name"], "Inland");
    }

    #[tokio::test]
    async fn duplicate_region_code_is_conflict() {
        let (core, _seeded, _tmp) = test_core();
        let app = api_router(Arc::new(core));

        let (status, json) = send(
            &app,
            request("POST", "/api/regions", Some(json!({ "name": "Copy", "code": "PNW" }))),
        )
        .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn booking_flow_through_status_and_stats() {
        let (core, seeded, _tmp) = test_core();
        let app = api_router(Arc::new(core));

        let (status, case) = send(&app, request("POST", "/api/cases", Some(booking_fields(&seeded)))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(case["case_number"].as_str().unwrap().starts_with("CASE-"));
        assert_eq!(case["status"], "scheduled");
        assert_eq!(case["surgeon_name"], seeded.surgeon.name);
        let id = case["id"].as_i64().unwrap();

        let (status, list) = send(&app, request("GET", "/api/cases?days=7", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, stats) = send(&app, request("GET", "/api/cases/stats", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["total"], 1);
        assert_eq!(stats["upcoming"], 1);
        assert_eq!(stats["by_status"]["scheduled"], 1);
        assert_eq!(stats["growth_rate"], 0.0);

        let (status, moved) = send(
            &app,
            request("POST", &format!("/api/cases/{id}/status"), Some(json!({ "status": "in_progress" }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!moved["actual_start"].is_null());

        let (status, json) = send(
            &app,
            request("POST", &format!("/api/cases/{id}/status"), Some(json!({ "status": "scheduled" }))),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(json["error"]["message"].as_str().unwrap().contains("in progress"));

        let (status, week) = send(&app, request("GET", "/api/schedule?week=2031-03-05", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(week["start"], "2031-03-03");
        assert_eq!(week["days"]["2031-03-04"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn non_positive_window_is_bad_request() {
        let (core, _seeded, _tmp) = test_core();
        let app = api_router(Arc::new(core));
        let (status, _) = send(&app, request("GET", "/api/cases?days=0", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn booking_with_unknown_surgeon_is_rejected() {
        let (core, seeded, _tmp) = test_core();
        let core = Arc::new(core);
        let app = api_router(core.clone());
        let mut fields = booking_fields(&seeded);
        fields["surgeon_id"] = json!("9999");

        let (status, _) = send(&app, request("POST", "/api/cases", Some(fields))).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let conn = core.open_db().unwrap();
        assert!(db::list_case_views(&conn, &Default::default()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn booking_against_deleted_surgeon_asks_for_reload() {
        let (core, seeded, _tmp) = test_core();
        let core = Arc::new(core);
        let app = api_router(core.clone());
        db::soft_delete(&core.open_db().unwrap(), Table::Surgeons, seeded.surgeon.id, "t").unwrap();

        let (status, json) = send(&app, request("POST", "/api/cases", Some(booking_fields(&seeded)))).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
        assert!(json["error"]["message"].as_str().unwrap().contains("no longer exists"));
        let conn = core.open_db().unwrap();
        assert!(db::list_case_views(&conn, &Default::default()).unwrap().is_empty());
    }

    fn seed_insight(core: &CoreState, category: InsightCategory, title: &str) -> i64 {
        db::insert_insight(
            &core.open_db().unwrap(),
            &NewInsight {
                category,
                title: title.into(),
                description: "details".into(),
                confidence_score: 0.7,
                recommendations: vec![],
                data: None,
                expires_at: None,
            },
            "generator",
        )
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn insights_filter_and_mark_viewed() {
        let (core, _seeded, _tmp) = test_core();
        let first = seed_insight(&core, InsightCategory::Inventory, "Low stock");
        seed_insight(&core, InsightCategory::Revenue, "Revenue dip");
        let app = api_router(Arc::new(core));

        let (status, page) = send(&app, request("GET", "/api/insights?category=inventory", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["insights"].as_array().unwrap().len(), 1);
        assert_eq!(page["loaded"], 2);
        assert_eq!(page["unviewed"], 2);

        let (status, insight) = send(&app, request("POST", &format!("/api/insights/{first}/viewed"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(insight["is_viewed"], true);

        let (status, _) = send(&app, request("POST", "/api/insights/9999/viewed", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn refresh_without_generator_is_unavailable() {
        let (core, _seeded, _tmp) = test_core();
        let app = api_router(Arc::new(core));
        let (status, json) = send(&app, request("POST", "/api/insights/refresh", None)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"]["code"], "GENERATOR_UNAVAILABLE");
    }

    /// Writes one insight row when triggered and reports completion on the
    /// second status poll.
    struct FakeGenerator {
        db_path: std::path::PathBuf,
        polls: std::sync::atomic::AtomicU32,
    }

    #[async_trait]
    impl InsightGenerator for FakeGenerator {
        async fn trigger(&self) -> Result<GenerationTicket, InsightError> {
            let conn = db::open_database(&self.db_path)?;
            db::insert_insight(
                &conn,
                &NewInsight {
                    category: InsightCategory::DemandForecast,
                    title: "Hip kits short next week".into(),
                    description: "Forecast".into(),
                    confidence_score: 0.9,
                    recommendations: vec!["Reorder".into()],
                    data: None,
                    expires_at: None,
                },
                "generator",
            )?;
            Ok(GenerationTicket { run_id: "run-42".into() })
        }

        async fn status(&self, _run_id: &str) -> Result<GenerationStatus, InsightError> {
            let n = self.polls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(if n == 0 {
                GenerationStatus::Pending
            } else {
                GenerationStatus::Completed { generated: 1 }
            })
        }
    }

    #[tokio::test]
    async fn refresh_polls_run_then_returns_fresh_page() {
        let (core, _seeded, _tmp) = test_core();
        let generator = FakeGenerator {
            db_path: core.db_path().to_path_buf(),
            polls: Default::default(),
        };
        let core = core
            .with_generator(Arc::new(generator))
            .with_refresh_policy(RefreshPolicy { interval: Duration::from_millis(1), max_polls: 5 });
        let app = api_router(Arc::new(core));

        let (status, json) = send(&app, request("POST", "/api/insights/refresh", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["run_id"], "run-42");
        assert_eq!(json["polls"], 2);
        assert_eq!(json["insights"][0]["title"], "Hip kits short next week");
    }

    #[tokio::test]
    async fn sales_report_omits_missing_sections() {
        let (core, _seeded, _tmp) = test_core();
        core.open_db().unwrap().execute_batch("DROP TABLE invoices;").unwrap();
        // Capabilities are detected at startup; re-detect the way a restart would.
        let caps = crate::capabilities::ReportCapabilities::detect(&core.open_db().unwrap()).unwrap();
        let mut core = core;
        core.capabilities = caps;
        let app = api_router(Arc::new(core));

        let (status, report) = send(&app, request("GET", "/api/reports/sales", None)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(report["revenue"].is_null());
        assert_eq!(report["pipeline"]["opportunity_count"], 0);
        assert_eq!(report["growth_rate"], 0.0);
    }

    #[tokio::test]
    async fn soft_deleted_surgeon_leaves_catalog() {
        let (core, seeded, _tmp) = test_core();
        db::soft_delete(&core.open_db().unwrap(), Table::Surgeons, seeded.surgeon.id, "t").unwrap();
        let app = api_router(Arc::new(core));

        let (_, surgeons) = send(&app, request("GET", "/api/surgeons", None)).await;

        assert!(surgeons.as_array().unwrap().is_empty());
    }
}
