//! Authentication route handlers
//!
//! - Login with email and password
//! - Refresh token rotation
//! - Logout of the current session and logout everywhere
//! - Listing of active sessions

pub mod cookie;
pub mod login;
pub mod logout;
pub mod logout_all;
pub mod refresh;
pub mod sessions;

use actix_web::HttpRequest;

/// Client address as seen through proxies
pub(crate) fn client_ip(req: &HttpRequest) -> Option<String> {
    req.connection_info().realip_remote_addr().map(str::to_string)
}

/// User-Agent, used when the client sends no device description
pub(crate) fn user_agent(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(actix_web::http::header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(|ua| ua.chars().take(512).collect())
}
