use actix_web::{web, HttpRequest, HttpResponse};

use crate::app::AppState;
use crate::dto::auth::LogoutResponse;
use crate::middleware::auth::optional_claims;

use super::cookie::{clear_refresh_cookie, read_refresh_token};

/// Handler for POST /api/v1/auth/logout
///
/// Revokes the refresh token from the cookie and blacklists the bearer access
/// token. Either may be missing; the call always succeeds and always clears
/// the cookie.
pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let refresh_token = read_refresh_token(&req, &state.cookie);
    let claims = optional_claims(&req, &state.policy).await;

    let outcome = state
        .auth
        .logout(refresh_token.as_deref(), claims.as_ref())
        .await;

    HttpResponse::Ok()
        .cookie(clear_refresh_cookie(&state.cookie))
        .json(LogoutResponse {
            message: "Logged out successfully".to_string(),
            refresh_revoked: outcome.refresh_revoked,
            access_blacklisted: outcome.access_blacklisted,
        })
}
