pub mod db;
pub mod handlers;
pub mod staff;

use actix_web::web;

pub fn configure_routes() -> impl actix_web::dev::HttpServiceFactory {
    web::scope("")
        .service(
            web::scope("/api")
                .route("/auth", web::post().to(handlers::auth))
                .route("/refresh", web::post().to(handlers::refresh_token))
                .route("/unauth", web::post().to(handlers::unauth))
                .route("/reports", web::post().to(handlers::submit_report))
                .route("/reports", web::get().to(handlers::list_reports))
                .route("/reports/{id}", web::get().to(handlers::get_report))
                .route("/reports/{id}", web::patch().to(handlers::resolve_report))
                .service(
                    web::scope("/admin")
                        .route("/create_account", web::post().to(handlers::admin_create_account))
                        .route("/revoke_account", web::post().to(handlers::admin_revoke_account))
                        .route("/audit_logs", web::get().to(handlers::admin_audit_logs))
                )
        )
}
