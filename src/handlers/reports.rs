use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Local;

use crate::auth::session::{Role, require_role};
use crate::config::AppConfig;
use crate::errors::{AppError, render};
use crate::models::report::{PageData, ReportQuery, ReportRequest, ReportSource, load_page_data};
use crate::templates_structs::{GnReportsTemplate, PageContext};

pub const PATH: &str = "/gn/reports";

/// GET /gn/reports: division statistics for the signed-in GN officer.
pub async fn index<S: ReportSource + 'static>(
    source: web::Data<S>,
    config: web::Data<AppConfig>,
    session: Session,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let user = match require_role(&session, Role::Gn, &config.login_path) {
        Ok(user) => user,
        Err(redirect) => return Ok(redirect),
    };

    let query = ReportQuery::parse(req.query_string());
    let request = ReportRequest::from_query(&query, Local::now().date_naive());
    log::debug!(
        "Report {} ({}) for office {}",
        request.kind().key(),
        request.period_label(),
        user.office_code
    );

    let scope = user.scope();
    let (data, error) =
        match load_page_data(source.get_ref(), &scope, &request, config.recent_activity_limit).await {
            Ok(data) => (data, None),
            Err(e) => {
                log::error!("Reports page for office {} failed: {e}", user.office_code);
                (PageData::default(), Some(format!("System Error: {e}")))
            }
        };

    let ctx = PageContext::build(&user, &config.app_name, PATH);
    render(GnReportsTemplate::new(ctx, &request, data, query.success, error))
}
