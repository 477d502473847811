pub mod reports;

use actix_web::{HttpResponse, web};

use crate::errors::AppError;
use crate::models::report::ReportSource;

/// Routes for the reports pages, backed by report source `S`.
pub fn configure<S: ReportSource + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(|| async {
        HttpResponse::SeeOther()
            .insert_header(("Location", reports::PATH))
            .finish()
    }))
    .route(reports::PATH, web::get().to(reports::index::<S>));
}

pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound)
}
