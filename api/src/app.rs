//! Application state and factory
//!
//! Builds the actix-web `App` serving the auth endpoints. The state carries the
//! fully wired `AuthService`, the per-request validation policy, and the
//! refresh cookie attributes.

use std::sync::Arc;

use actix_web::{web, App, HttpResponse};
use tracing_actix_web::TracingLogger;

use rh_core::{AuthService, TokenValidationPolicy};
use rh_shared::config::RefreshCookieConfig;

use crate::handlers::error::json_error_handler;
use crate::middleware::JwtAuth;
use crate::routes::auth::{login, logout, logout_all, refresh, sessions};

/// Shared state handed to every handler
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub policy: Arc<TokenValidationPolicy>,
    pub cookie: RefreshCookieConfig,
}

impl AppState {
    pub fn new(
        auth: Arc<AuthService>,
        policy: Arc<TokenValidationPolicy>,
        cookie: RefreshCookieConfig,
    ) -> Self {
        Self {
            auth,
            policy,
            cookie,
        }
    }
}

/// Create and configure the application with all dependencies
pub fn create_app(
    app_state: web::Data<AppState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<
            impl actix_web::body::MessageBody,
        >,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(app_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/v1").service(
                web::scope("/auth")
                    .route("/login", web::post().to(login::login))
                    .route("/refresh", web::post().to(refresh::refresh))
                    .route("/logout", web::post().to(logout::logout))
                    .route(
                        "/logout-all",
                        web::post().to(logout_all::logout_all).wrap(JwtAuth::new()),
                    )
                    .route(
                        "/sessions",
                        web::get().to(sessions::list_sessions).wrap(JwtAuth::new()),
                    ),
            ),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "reporthub-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(rh_shared::errors::ErrorResponse::new(
        rh_shared::errors::error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
