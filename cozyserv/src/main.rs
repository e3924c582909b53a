use tracing::info;

use actix_web::{App, HttpServer, middleware::Logger, web};

use cozy::auth::SessionAuth;
use cozy::tls::load_rustls_config;
use cozyserv::{configure_routes, db, staff::StaffSessions};
use std::path::Path;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let mut _guard = None;

    if std::env::var("SERVER_LOG").unwrap_or_default() == "true" {
        let file_appender = tracing_appender::rolling::RollingFileAppender::new(
            tracing_appender::rolling::Rotation::DAILY,
            "./logs",
            "cozy-server.log"
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::fmt()
            .with_writer(tracing_subscriber::fmt::writer::MakeWriterExt::and(non_blocking, std::io::stdout))
            .with_file(true)
            .with_line_number(true)
            .with_env_filter("info,actix_server=warn,actix_http::h1::dispatcher=off")
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new("%Y-%m-%dT%H:%M:%S".to_string()))
            .init();

        _guard = Some(guard);
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stdout)
            .with_file(true)
            .with_line_number(true)
            .with_env_filter("info,actix_server=warn,actix_http::h1::dispatcher=off")
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new("%Y-%m-%dT%H:%M:%S".to_string()))
            .init();
    }

    let use_tls = std::env::var("USE_TLS").unwrap_or_default() == "true";

    // Initialize SQLite database
    let database_url = std::env::var("COZY_DB").unwrap_or_else(|_| "cozy.db".to_string());
    let db_pool = db::init::init_db(&database_url)
        .expect("Failed to initialize database");

    db::init::run_migrations(&db_pool)
        .expect("Failed to run database migrations");

    // Initialize admin account for bootstrapping
    db::init::init_admin_account(&db_pool)
        .expect("Failed to initialize admin account");

    tracing::info!("✅ Database initialized ({})", database_url);

    // Session state shared across all workers
    let session_auth = web::Data::new(SessionAuth::new());
    let staff_sessions = web::Data::new(StaffSessions::default());

    let db_data = web::Data::new(db_pool);

    if use_tls {
        info!("Server starting with TLS on https://127.0.0.1:8443/");

        let cert_path = std::env::var("COZY_CERT").unwrap_or_else(|_| "cert.pem".to_string());
        let key_path = std::env::var("COZY_KEY").unwrap_or_else(|_| "key.pem".to_string());

        let config = load_rustls_config(Path::new(&cert_path), Path::new(&key_path))
            .expect("Failed to load TLS certificate/key");

        HttpServer::new(move || {
            App::new()
                .app_data(session_auth.clone())
                .app_data(staff_sessions.clone())
                .app_data(db_data.clone())
                .wrap(Logger::default())
                .service(configure_routes())
        })
        .bind_rustls_0_23(("0.0.0.0", 8443), config)?
        .run()
        .await
    } else {
        info!("Server starting on http://127.0.0.1:8080/");

        HttpServer::new(move || {
            App::new()
                .app_data(session_auth.clone())
                .app_data(staff_sessions.clone())
                .app_data(db_data.clone())
                .wrap(Logger::default())
                .service(configure_routes())
        })
        .bind(("0.0.0.0", 8080))?
        .run()
        .await
    }
}
