use actix_web::{web, HttpResponse};

use crate::app::AppState;
use crate::dto::auth::LogoutAllResponse;
use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::AuthContext;

use super::cookie::clear_refresh_cookie;

/// Handler for POST /api/v1/auth/logout-all
///
/// Invalidates every access token issued to the caller so far and revokes all
/// of their refresh sessions. Requires a bearer token.
pub async fn logout_all(state: web::Data<AppState>, auth: AuthContext) -> HttpResponse {
    match state.auth.logout_all(auth.user_id()).await {
        Ok(revoked_sessions) => HttpResponse::Ok()
            .cookie(clear_refresh_cookie(&state.cookie))
            .json(LogoutAllResponse {
                message: "Logged out from all devices".to_string(),
                revoked_sessions,
            }),
        Err(error) => handle_domain_error(&error),
    }
}
