//! Bearer-token authentication middleware for protecting API endpoints.
//!
//! Extracts the access token from the Authorization header, runs it through
//! the `TokenValidationPolicy` held in `AppState` (signature, issuer, expiry,
//! blacklist and logout-all cutoff), and injects the claims into the request.
//! Rejections are answered directly with the JSON error body.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    http::header::{HeaderMap, AUTHORIZATION},
    web, Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
};

use rh_core::{AccessClaims, DomainError, TokenError, TokenValidationPolicy};
use rh_shared::errors::{error_codes, ErrorResponse};

use crate::app::AppState;
use crate::handlers::error::handle_domain_error;

/// Authenticated caller, injected by `JwtAuth`
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: AccessClaims,
}

impl AuthContext {
    pub fn user_id(&self) -> i64 {
        self.claims.user_id
    }
}

/// Bearer-token authentication middleware factory
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtAuth;

impl JwtAuth {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let token = match bearer_token(req.headers()) {
                Some(token) => token.to_string(),
                None => {
                    let response = handle_domain_error(&DomainError::Token(TokenError::TokenInvalid));
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                tracing::error!("AppState missing; protected route cannot authenticate");
                let response = HttpResponse::InternalServerError().json(ErrorResponse::new(
                    error_codes::INTERNAL_ERROR,
                    "Authentication is not configured",
                ));
                return Ok(req.into_response(response).map_into_right_body());
            };

            match state.policy.validate(&token).await {
                Ok(claims) => {
                    req.extensions_mut().insert(AuthContext { claims });
                    let response = service.call(req).await?;
                    Ok(response.map_into_left_body())
                }
                Err(e) => {
                    let response = handle_domain_error(&e);
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// Token after the `Bearer ` prefix, if any
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Claims of a still-valid bearer token, for endpoints where authentication is optional
pub async fn optional_claims(
    req: &HttpRequest,
    policy: &TokenValidationPolicy,
) -> Option<AccessClaims> {
    let token = bearer_token(req.headers())?;
    match policy.validate(token).await {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring unusable bearer token");
            None
        }
    }
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ErrorUnauthorized("Authentication required"));

        ready(result)
    }
}
