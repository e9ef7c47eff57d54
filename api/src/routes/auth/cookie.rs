//! Refresh token cookie handling

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpRequest;
use rh_shared::config::RefreshCookieConfig;

fn same_site(raw: &str) -> SameSite {
    match raw.to_ascii_lowercase().as_str() {
        "lax" => SameSite::Lax,
        "none" => SameSite::None,
        _ => SameSite::Strict,
    }
}

/// Cookie carrying a freshly issued refresh token
pub fn refresh_cookie(config: &RefreshCookieConfig, token: &str, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build(config.name.clone(), token.to_string())
        .path(config.path.clone())
        .secure(config.secure)
        .http_only(config.http_only)
        .same_site(same_site(&config.same_site))
        .max_age(Duration::seconds(max_age_secs.max(0)))
        .finish()
}

/// Expired cookie that makes the browser drop the refresh token
pub fn clear_refresh_cookie(config: &RefreshCookieConfig) -> Cookie<'static> {
    refresh_cookie(config, "", 0)
}

/// Refresh token sent by the client, if any
pub fn read_refresh_token(req: &HttpRequest, config: &RefreshCookieConfig) -> Option<String> {
    req.cookie(&config.name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_cookie_attributes() {
        let config = RefreshCookieConfig::default();
        let cookie = refresh_cookie(&config, "opaque", 1_209_600);

        assert_eq!(cookie.name(), "refresh_token");
        assert_eq!(cookie.value(), "opaque");
        assert_eq!(cookie.path(), Some("/api/v1/auth"));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(1_209_600)));
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let config = RefreshCookieConfig {
            same_site: "Lax".to_string(),
            ..RefreshCookieConfig::default()
        };
        let cookie = clear_refresh_cookie(&config);

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }
}
