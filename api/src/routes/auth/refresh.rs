use actix_web::{web, HttpRequest, HttpResponse};

use crate::app::AppState;
use crate::dto::auth::TokenResponse;
use crate::handlers::error::{handle_domain_error, status_for};

use super::cookie::{clear_refresh_cookie, read_refresh_token, refresh_cookie};

/// Handler for POST /api/v1/auth/refresh
///
/// Rotates the refresh token from the cookie and returns a new access token.
/// A rejected refresh token also clears the cookie.
///
/// ## Errors
/// - 401 Unauthorized: Missing, rotated, revoked or expired refresh token, or disabled account
/// - 503 Service Unavailable: Token stores unreachable
pub async fn refresh(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let token = read_refresh_token(&req, &state.cookie).unwrap_or_default();

    match state.auth.refresh(&token).await {
        Ok(response) => HttpResponse::Ok()
            .cookie(refresh_cookie(
                &state.cookie,
                &response.refresh_token,
                response.refresh_expires_in,
            ))
            .json(TokenResponse::from(&response)),
        Err(error) => {
            let mut response = handle_domain_error(&error);
            if status_for(&error) == actix_web::http::StatusCode::UNAUTHORIZED {
                if let Err(e) = response.add_cookie(&clear_refresh_cookie(&state.cookie)) {
                    tracing::warn!(error = %e, "Failed to clear refresh cookie");
                }
            }
            response
        }
    }
}
