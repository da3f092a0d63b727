//! Defines functions for handling owner authentication with cookies.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{Error, OwnerId, auth::Token};

/// The name of the cookie that holds the auth token.
pub const COOKIE_TOKEN: &str = "token";
/// The default duration for which auth cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(30);

/// Add an auth cookie to the cookie jar, indicating that `owner_id` is logged in and authenticated.
///
/// Sets the expiry of the cookie and of the token inside it to `duration`
/// from the current time. You can use [DEFAULT_COOKIE_DURATION] for the
/// default duration.
///
/// Returns the cookie jar with the cookie added.
///
/// # Errors
/// Returns [Error::JSONSerializationError] if the token cannot be serialized.
pub fn set_auth_cookie(
    jar: PrivateCookieJar,
    owner_id: OwnerId,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc() + duration;
    let token = Token {
        owner_id,
        expires_at,
    };
    let token_string = serde_json::to_string(&token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_TOKEN, token_string))
            .expires(expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Replace the auth cookie with an expired one so that the client drops it.
pub fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Get the auth token from the cookie jar.
///
/// # Errors
/// Returns [Error::Unauthorized] if the cookie is missing, could not be
/// decrypted, does not hold a token or holds an expired token.
pub fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::Unauthorized)?;

    let token: Token = serde_json::from_str(cookie.value()).map_err(|error| {
        tracing::warn!("Could not parse auth token: {error}");
        Error::Unauthorized
    })?;

    if token.is_expired(OffsetDateTime::now_utc()) {
        tracing::debug!("Rejected expired auth token for owner {}", token.owner_id);
        return Err(Error::Unauthorized);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key, SameSite},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{Error, OwnerId};

    use super::{
        COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, get_token_from_cookies, invalidate_auth_cookie,
        set_auth_cookie,
    };

    fn get_jar() -> PrivateCookieJar {
        PrivateCookieJar::new(Key::from(&Sha512::digest("foobar")))
    }

    #[test]
    fn set_auth_cookie_stores_owner() {
        let jar = set_auth_cookie(get_jar(), OwnerId::new(7), DEFAULT_COOKIE_DURATION).unwrap();

        let token = get_token_from_cookies(&jar).unwrap();

        assert_eq!(token.owner_id, OwnerId::new(7));
    }

    #[test]
    fn set_auth_cookie_sets_secure_attributes() {
        let jar = set_auth_cookie(get_jar(), OwnerId::new(1), DEFAULT_COOKIE_DURATION).unwrap();

        let cookie = jar.get(COOKIE_TOKEN).unwrap();

        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
    }

    #[test]
    fn set_auth_cookie_sets_expiry() {
        let want = OffsetDateTime::now_utc() + Duration::minutes(5);
        let jar = set_auth_cookie(get_jar(), OwnerId::new(1), Duration::minutes(5)).unwrap();

        let got = get_token_from_cookies(&jar).unwrap().expires_at;

        assert!((got - want).abs() < Duration::seconds(1));
    }

    #[test]
    fn missing_cookie_is_unauthorized() {
        assert_eq!(
            get_token_from_cookies(&get_jar()).err(),
            Some(Error::Unauthorized)
        );
    }

    #[test]
    fn malformed_token_is_unauthorized() {
        let jar = get_jar().add(Cookie::new(COOKIE_TOKEN, "FOOBAR"));

        assert_eq!(get_token_from_cookies(&jar).err(), Some(Error::Unauthorized));
    }

    #[test]
    fn invalidated_cookie_is_expired_and_unauthorized() {
        let jar = set_auth_cookie(get_jar(), OwnerId::new(1), DEFAULT_COOKIE_DURATION).unwrap();

        let jar = invalidate_auth_cookie(jar);
        let cookie = jar.get(COOKIE_TOKEN).unwrap();

        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        assert_eq!(get_token_from_cookies(&jar).err(), Some(Error::Unauthorized));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let jar = set_auth_cookie(get_jar(), OwnerId::new(1), Duration::seconds(-1)).unwrap();

        assert_eq!(get_token_from_cookies(&jar).err(), Some(Error::Unauthorized));
    }
}
