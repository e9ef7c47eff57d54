//! Shared helpers for the HTTP tests

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::{http::header, test, web};
use rh_api::AppState;
use rh_core::testing::{TestAuthStack, TEST_PASSWORD};
use rh_shared::config::RefreshCookieConfig;

pub const COOKIE_NAME: &str = "refresh_token";

pub fn app_state(stack: &TestAuthStack) -> web::Data<AppState> {
    web::Data::new(AppState::new(
        stack.auth.clone(),
        stack.policy.clone(),
        RefreshCookieConfig::default(),
    ))
}

pub fn login_request(email: &str, device_id: Option<&str>) -> test::TestRequest {
    let mut body = serde_json::json!({ "email": email, "password": TEST_PASSWORD });
    if let Some(device_id) = device_id {
        body["deviceId"] = serde_json::Value::String(device_id.to_string());
    }
    test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .insert_header((header::USER_AGENT, "integration-test"))
        .set_json(body)
}

pub fn refresh_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == COOKIE_NAME)
        .map(|c| c.into_owned())
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}
