//! Session handling: the auth cookie, the log-in/register/log-out routes, and
//! the route guards that decide who sees what.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;

use crate::endpoints;

mod cookie;
mod log_in;
mod log_out;
mod middleware;
mod register;
mod token;

pub(crate) use cookie::DEFAULT_COOKIE_DURATION;
pub use log_in::{get_log_in_page, post_log_in};
pub use log_out::get_log_out;
pub use middleware::{AuthState, auth_guard, auth_guard_hx, public_only_guard};
pub use register::{get_register_page, post_register};
pub use token::SessionToken;

use cookie::invalidate_auth_cookie;

/// Clear the session cookie and redirect the client to the log-in page.
///
/// This is the one response to a backend `401 Unauthorized`: the bearer token
/// the cookie carried is no longer accepted, so the stored session is useless
/// and the user has to log in again.
pub fn force_reauthentication(jar: PrivateCookieJar) -> Response {
    (
        invalidate_auth_cookie(jar),
        Redirect::to(endpoints::LOG_IN_VIEW),
    )
        .into_response()
}

/// Same as [force_reauthentication] but uses the HX-Redirect header so that
/// HTMX requests navigate the whole page to the log-in view.
pub fn force_reauthentication_hx(jar: PrivateCookieJar) -> Response {
    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
        invalidate_auth_cookie(jar),
    )
        .into_response()
}

#[cfg(test)]
mod force_reauthentication_tests {
    use axum::http::{StatusCode, header::LOCATION};
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use axum_htmx::HX_REDIRECT;
    use sha2::{Digest, Sha512};

    use crate::endpoints;

    use super::{
        cookie::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, set_auth_cookie},
        force_reauthentication, force_reauthentication_hx,
    };

    fn get_jar_with_session() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let jar = PrivateCookieJar::new(Key::from(&hash));

        set_auth_cookie(jar, "abc123", DEFAULT_COOKIE_DURATION)
            .expect("Could not set auth cookie")
    }

    #[test]
    fn redirects_to_log_in_and_clears_cookie() {
        let response = force_reauthentication(get_jar_with_session());

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            endpoints::LOG_IN_VIEW
        );

        let set_cookie = response
            .headers()
            .get("set-cookie")
            .expect("expected a set-cookie header")
            .to_str()
            .unwrap();
        assert!(set_cookie.starts_with(COOKIE_TOKEN));
        assert!(set_cookie.contains("Max-Age=0"));
    }

    #[test]
    fn hx_variant_uses_hx_redirect_header() {
        let response = force_reauthentication_hx(get_jar_with_session());

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT).unwrap(),
            endpoints::LOG_IN_VIEW
        );
        assert!(response.headers().get("set-cookie").is_some());
    }
}
