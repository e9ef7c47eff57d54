use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use rh_core::DomainError;

use crate::app::AppState;
use crate::dto::auth::{LoginRequest, TokenResponse};
use crate::handlers::error::handle_domain_error;

use super::cookie::refresh_cookie;
use super::{client_ip, user_agent};

/// Handler for POST /api/v1/auth/login
///
/// Authenticates email and password, returns the access token in the body and
/// sets the refresh token cookie.
///
/// ## Errors
/// - 400 Bad Request: Malformed body
/// - 401 Unauthorized: Wrong credentials or disabled account
/// - 503 Service Unavailable: Token stores unreachable
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    if let Err(errors) = request.validate() {
        return handle_domain_error(&DomainError::Validation {
            message: errors.to_string(),
        });
    }

    let request = request.into_inner();
    let device_info = request.device_info.or_else(|| user_agent(&req));

    match state
        .auth
        .login(
            &request.email,
            &request.password,
            request.device_id.as_deref(),
            device_info,
            client_ip(&req),
        )
        .await
    {
        Ok(response) => HttpResponse::Ok()
            .cookie(refresh_cookie(
                &state.cookie,
                &response.refresh_token,
                response.refresh_expires_in,
            ))
            .json(TokenResponse::from(&response)),
        Err(error) => handle_domain_error(&error),
    }
}
