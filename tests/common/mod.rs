//! Shared test infrastructure for the reports page.
//!
//! - `FakeSource`: in-memory `ReportSource` that records every call and the
//!   division it was scoped to.
//! - `test_app!`: actix test service wired like `main.rs`, plus a
//!   `/__test/session` route that plays the part of the login service.
#![allow(dead_code, unused_macros)]

use std::sync::Mutex;

use actix_session::Session;
use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::{HttpResponse, test, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use gn_reports::auth::session::{Role, SESSION_COOKIE, SessionContext, keys};
use gn_reports::config::AppConfig;
use gn_reports::models::report::{
    ActivityEntry, ChartData, ChartPoint, DivisionScope, QuickStats, ReportData, ReportSource,
};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const TEST_KEY: [u8; 64] = [7; 64];
pub const GN_OFFICE: &str = "GN-101";
pub const REPORTS_PATH: &str = "/gn/reports";

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".to_string(),
        ..AppConfig::default()
    }
}

// ============================================================================
// FAKE REPORT SOURCE
// ============================================================================

#[derive(Default)]
pub struct FakeSource {
    calls: Mutex<Vec<String>>,
    scopes: Mutex<Vec<String>>,
    pub table: Option<ReportData>,
    pub chart: Option<ChartData>,
    pub activities: Vec<ActivityEntry>,
    pub quick_stats: QuickStats,
    pub fail_with: Option<String>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: serde_json::Value) -> Self {
        self.table = Some(table.as_object().cloned().expect("table must be a JSON object"));
        self
    }

    pub fn with_chart(mut self, chart: ChartData) -> Self {
        self.chart = Some(chart);
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn scopes(&self) -> Vec<String> {
        self.scopes.lock().unwrap().clone()
    }

    fn record(&self, call: String, scope: &DivisionScope) -> Result<(), sqlx::Error> {
        self.calls.lock().unwrap().push(call);
        self.scopes.lock().unwrap().push(scope.office_code().to_string());
        match &self.fail_with {
            Some(msg) => Err(sqlx::Error::Protocol(msg.clone())),
            None => Ok(()),
        }
    }

    fn table(&self, call: &str, scope: &DivisionScope) -> Result<ReportData, sqlx::Error> {
        self.record(call.to_string(), scope)?;
        Ok(self.table.clone().unwrap_or_else(|| {
            let mut data = ReportData::new();
            data.insert(format!("from {call}"), json!({ "count": 1 }));
            data
        }))
    }

    fn chart(&self, call: &str, scope: &DivisionScope) -> Result<ChartData, sqlx::Error> {
        self.record(call.to_string(), scope)?;
        Ok(self.chart.clone().unwrap_or_else(|| {
            ChartData::Points(vec![ChartPoint { label: format!("from {call}"), value: 1.0 }])
        }))
    }
}

impl ReportSource for FakeSource {
    async fn overview_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error> {
        self.table("overview_stats", scope)
    }
    async fn population_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error> {
        self.table("population_stats", scope)
    }
    async fn family_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error> {
        self.table("family_stats", scope)
    }
    async fn demographic_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error> {
        self.table("demographic_stats", scope)
    }
    async fn education_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error> {
        self.table("education_stats", scope)
    }
    async fn employment_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error> {
        self.table("employment_stats", scope)
    }
    async fn health_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error> {
        self.table("health_stats", scope)
    }
    async fn age_group_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error> {
        self.table("age_group_stats", scope)
    }
    async fn gender_stats(&self, scope: &DivisionScope) -> Result<ReportData, sqlx::Error> {
        self.table("gender_stats", scope)
    }
    async fn monthly_report(
        &self,
        scope: &DivisionScope,
        year: i32,
        month: u32,
    ) -> Result<ReportData, sqlx::Error> {
        self.table(&format!("monthly_report({year}, {month})"), scope)
    }

    async fn monthly_registration_trend(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error> {
        self.chart("monthly_registration_trend", scope)
    }
    async fn population_distribution(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error> {
        self.chart("population_distribution", scope)
    }
    async fn family_size_distribution(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error> {
        self.chart("family_size_distribution", scope)
    }
    async fn demographic_distribution(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error> {
        self.chart("demographic_distribution", scope)
    }
    async fn education_distribution(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error> {
        self.chart("education_distribution", scope)
    }
    async fn employment_distribution(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error> {
        self.chart("employment_distribution", scope)
    }
    async fn health_chart(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error> {
        self.chart("health_chart", scope)
    }
    async fn age_pyramid(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error> {
        self.chart("age_pyramid", scope)
    }
    async fn gender_chart(&self, scope: &DivisionScope) -> Result<ChartData, sqlx::Error> {
        self.chart("gender_chart", scope)
    }
    async fn monthly_comparison(
        &self,
        scope: &DivisionScope,
        year: i32,
        month: u32,
    ) -> Result<ChartData, sqlx::Error> {
        self.chart(&format!("monthly_comparison({year}, {month})"), scope)
    }

    async fn recent_activities(
        &self,
        scope: &DivisionScope,
        limit: i64,
    ) -> Result<Vec<ActivityEntry>, sqlx::Error> {
        self.record(format!("recent_activities({limit})"), scope)?;
        Ok(self.activities.clone())
    }

    async fn quick_stats(&self, scope: &DivisionScope) -> Result<QuickStats, sqlx::Error> {
        self.record("quick_stats".to_string(), scope)?;
        Ok(self.quick_stats.clone())
    }
}

// ============================================================================
// SESSIONS
// ============================================================================

/// What the login service would have stored in the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFixture {
    pub user_id: i64,
    /// `None` leaves the key out of the session entirely.
    pub office_code: Option<String>,
    pub username: String,
    pub office_name: String,
    pub role: String,
}

pub fn gn_user() -> SessionFixture {
    SessionFixture {
        user_id: 42,
        office_code: Some(GN_OFFICE.to_string()),
        username: "nimal".to_string(),
        office_name: "Kandy North".to_string(),
        role: "gn".to_string(),
    }
}

pub fn gn_context(office_code: &str) -> SessionContext {
    SessionContext {
        user_id: 42,
        office_code: office_code.to_string(),
        username: "nimal".to_string(),
        office_name: "Kandy North".to_string(),
        role: Role::Gn,
    }
}

pub async fn set_session(session: Session, body: web::Json<SessionFixture>) -> HttpResponse {
    let f = body.into_inner();
    session.insert(keys::USER_ID, f.user_id).unwrap();
    if let Some(office_code) = f.office_code {
        session.insert(keys::OFFICE_CODE, office_code).unwrap();
    }
    session.insert(keys::USERNAME, f.username).unwrap();
    session.insert(keys::OFFICE_NAME, f.office_name).unwrap();
    session.insert(keys::ROLE, f.role).unwrap();
    HttpResponse::Ok().finish()
}

pub fn session_request(fixture: &SessionFixture) -> test::TestRequest {
    test::TestRequest::post().uri("/__test/session").set_json(fixture)
}

pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Cookie<'static> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
        .expect("session cookie set")
}

/// Test service with the session middleware, config and `source` registered.
macro_rules! test_app {
    ($source:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(gn_reports::auth::session::session_middleware(
                    actix_web::cookie::Key::from(&common::TEST_KEY[..]),
                    false,
                ))
                .app_data(actix_web::web::Data::new(common::test_config()))
                .app_data($source.clone())
                .route("/__test/session", actix_web::web::post().to(common::set_session))
                .configure(gn_reports::handlers::configure::<common::FakeSource>)
                .default_service(actix_web::web::to(gn_reports::handlers::not_found)),
        )
        .await
    };
}
