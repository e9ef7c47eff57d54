use actix_web::{web, HttpResponse};

use crate::app::AppState;
use crate::dto::auth::SessionResponse;
use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::AuthContext;

/// Handler for GET /api/v1/auth/sessions
///
/// Active refresh sessions of the caller, newest first.
pub async fn list_sessions(state: web::Data<AppState>, auth: AuthContext) -> HttpResponse {
    match state.auth.sessions(auth.user_id()).await {
        Ok(records) => {
            let sessions: Vec<SessionResponse> = records.iter().map(SessionResponse::from).collect();
            HttpResponse::Ok().json(sessions)
        }
        Err(error) => handle_domain_error(&error),
    }
}
