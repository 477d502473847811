use actix_web::{App, HttpServer, middleware, web};

use gn_reports::auth::session::session_middleware;
use gn_reports::config::AppConfig;
use gn_reports::models::report::PgReportGenerator;
use gn_reports::{db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .map_err(std::io::Error::other)?;
    db::run_migrations(&pool).await.map_err(std::io::Error::other)?;

    let generator = web::Data::new(PgReportGenerator::new(pool));
    let secret_key = config.cookie_key();
    let cookie_secure = config.cookie_secure;
    let bind_addr = config.bind_addr.clone();
    let config = web::Data::new(config);

    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        App::new()
            .wrap(session_middleware(secret_key.clone(), cookie_secure))
            .wrap(middleware::Logger::default())
            .app_data(config.clone())
            .app_data(generator.clone())
            .service(actix_files::Files::new("/static", "./static"))
            .configure(handlers::configure::<PgReportGenerator>)
            // Default 404 handler (must be registered last)
            .default_service(web::to(handlers::not_found))
    })
    .bind(bind_addr)?
    .run()
    .await
}
