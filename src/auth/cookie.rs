//! refresh_token cookie 构造

use axum_extra::extract::cookie::{Cookie, SameSite};

pub const REFRESH_COOKIE: &str = "refresh_token";

/// HttpOnly refresh cookie; max-age follows the refresh token lifetime
pub fn refresh_cookie(token: impl Into<String>, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token.into()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Expired replacement used on logout
pub fn clear_refresh_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}
