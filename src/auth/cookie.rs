//! Defines functions for handling the session cookie.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::Error;

use super::token::SessionToken;

/// The name of the private cookie holding the serialized [SessionToken].
pub(crate) const COOKIE_TOKEN: &str = "token";
/// The default duration for which auth cookies are valid.
pub(crate) const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(30);

/// Add an auth cookie to the cookie jar, indicating that a user is logged in
/// and authenticated against the backend services.
///
/// Sets the initial expiry of the cookie to `duration` from the current time.
///
/// Returns the cookie jar with the cookie added.
///
/// # Errors
/// Returns [Error::Serialization] if the session token cannot be serialized.
pub(crate) fn set_auth_cookie(
    jar: PrivateCookieJar,
    bearer: &str,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc() + duration;
    let token = SessionToken {
        bearer: bearer.to_owned(),
        expires_at,
    };

    build_token_cookie(jar, &token)
}

/// Set the auth cookie to an invalid value and set its max age to zero, which
/// should delete the cookie on the client side.
pub(crate) fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Read and validate the session token from the cookie jar.
///
/// # Errors
/// - [Error::CookieMissing] if there is no auth cookie.
/// - [Error::InvalidCredentials] if the cookie value cannot be parsed.
/// - [Error::SessionExpired] if the token's expiry has passed.
pub(crate) fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<SessionToken, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;
    let token: SessionToken =
        serde_json::from_str(cookie.value_trimmed()).map_err(|_| Error::InvalidCredentials)?;

    if !token.is_valid_at(OffsetDateTime::now_utc()) {
        return Err(Error::SessionExpired);
    }

    Ok(token)
}

/// Set the expiry of the auth cookie in `jar` to the latest of UTC now plus
/// `duration` and the token's current expiry, so that active sessions stay
/// alive while idle ones lapse.
///
/// # Errors
/// The cookie jar is not modified if an error is returned.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let token = get_token_from_cookies(&jar)?;

    let new_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or(Error::SessionExpired)?;
    let token = SessionToken {
        expires_at: max(token.expires_at, new_expiry),
        ..token
    };

    build_token_cookie(jar, &token)
}

fn build_token_cookie(
    jar: PrivateCookieJar,
    token: &SessionToken,
) -> Result<PrivateCookieJar, Error> {
    let value =
        serde_json::to_string(token).map_err(|error| Error::Serialization(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_TOKEN, value))
            .expires(token.expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

#[cfg(test)]
mod cookie_tests {
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::Error;

    use super::{
        COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, extend_auth_cookie_duration_if_needed,
        get_token_from_cookies, invalidate_auth_cookie, set_auth_cookie,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    /// Test helper macro to assert that two date times are within one second
    /// of each other. Used instead of a function so that the file and line
    /// number of the caller is included in the error message instead of the
    /// helper.
    macro_rules! assert_date_time_close {
        ($left:expr, $right:expr) => {
            assert!(
                ($left - $right).abs() < Duration::seconds(1),
                "got date time {:?}, want {:?}",
                $left,
                $right
            );
        };
    }

    #[test]
    fn can_set_and_read_cookie() {
        let jar = set_auth_cookie(get_jar(), "abc123", DEFAULT_COOKIE_DURATION).unwrap();

        let token = get_token_from_cookies(&jar).unwrap();

        assert_eq!(token.bearer, "abc123");
        assert_date_time_close!(
            token.expires_at,
            OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION
        );
    }

    #[test]
    fn missing_cookie_is_an_error() {
        let jar = get_jar();

        assert_eq!(
            get_token_from_cookies(&jar).unwrap_err(),
            Error::CookieMissing
        );
    }

    #[test]
    fn expired_token_is_an_error() {
        let jar = set_auth_cookie(get_jar(), "abc123", Duration::minutes(-5)).unwrap();

        assert_eq!(
            get_token_from_cookies(&jar).unwrap_err(),
            Error::SessionExpired
        );
    }

    #[test]
    fn can_extend_cookie_duration() {
        let jar = set_auth_cookie(get_jar(), "abc123", Duration::minutes(5)).unwrap();

        let jar = extend_auth_cookie_duration_if_needed(jar, Duration::minutes(10)).unwrap();

        let token = get_token_from_cookies(&jar).unwrap();
        assert_date_time_close!(
            token.expires_at,
            OffsetDateTime::now_utc() + Duration::minutes(10)
        );

        let cookie = jar.get(COOKIE_TOKEN).unwrap();
        assert_date_time_close!(cookie.expires_datetime().unwrap(), token.expires_at);
    }

    #[test]
    fn cookie_duration_does_not_shrink() {
        let jar = set_auth_cookie(get_jar(), "abc123", DEFAULT_COOKIE_DURATION).unwrap();
        let want = get_token_from_cookies(&jar).unwrap().expires_at;

        // The initial cookie expires later than now + 5 seconds, so the
        // extension should leave the expiry unchanged.
        let jar = extend_auth_cookie_duration_if_needed(jar, Duration::seconds(5)).unwrap();

        let token = get_token_from_cookies(&jar).unwrap();
        assert_eq!(token.expires_at, want);
    }

    #[test]
    fn invalidate_auth_cookie_succeeds() {
        let jar = set_auth_cookie(get_jar(), "abc123", DEFAULT_COOKIE_DURATION).unwrap();

        let jar = invalidate_auth_cookie(jar);
        let cookie = jar.get(COOKIE_TOKEN).unwrap();

        assert_eq!(cookie.value(), "deleted");
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));

        assert_eq!(
            get_token_from_cookies(&jar).unwrap_err(),
            Error::InvalidCredentials
        );
    }
}
