use actix_web::{
    error::{InternalError, JsonPayloadError},
    http::StatusCode,
    HttpRequest, HttpResponse,
};
use rh_core::errors::{DomainError, TokenError};
use rh_shared::errors::{error_codes, ErrorResponse};

/// HTTP status for a domain error
///
/// Credential and token problems are 401. Signing failures on our side are
/// server errors even though they surface as `TokenError`.
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Token(TokenError::TokenGenerationFailed)
        | DomainError::Token(TokenError::KeyLoadError { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
        DomainError::Auth(_) | DomainError::Token(_) => StatusCode::UNAUTHORIZED,
        DomainError::Storage { .. } => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Handle domain errors and convert them to appropriate HTTP responses
pub fn handle_domain_error(error: &DomainError) -> HttpResponse {
    let status = status_for(error);
    if status.is_server_error() {
        tracing::error!(error = %error, "Request failed");
    } else {
        tracing::debug!(error = %error, "Request rejected");
    }

    HttpResponse::build(status).json(ErrorResponse::from(error))
}

/// Malformed JSON bodies get the same error shape as domain validation failures
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let body = ErrorResponse::new(error_codes::BAD_REQUEST, err.to_string());
    let response = HttpResponse::BadRequest().json(body);
    InternalError::from_response(err, response).into()
}
