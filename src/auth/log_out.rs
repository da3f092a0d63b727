//! The route handler for logging out.

use axum::http::StatusCode;
use axum_extra::extract::PrivateCookieJar;

use crate::auth::cookie::invalidate_auth_cookie;

/// Invalidate the auth cookie and respond with `204 No Content`.
pub async fn post_log_out(jar: PrivateCookieJar) -> (StatusCode, PrivateCookieJar) {
    (StatusCode::NO_CONTENT, invalidate_auth_cookie(jar))
}
