//! Session guard middleware that validates the auth cookie, extends active
//! sessions, and redirects visitors to the right place.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::{Duration, OffsetDateTime};

use crate::{
    AppState,
    auth::{cookie::extend_auth_cookie_duration_if_needed, cookie::get_token_from_cookies},
    endpoints,
};

use super::token::SessionToken;

/// The state needed for the session guard middleware.
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Where the session guard sends a visitor.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum GuardOutcome {
    /// Let the request through.
    Allow,
    /// No valid session on a protected route.
    RedirectToLogIn,
    /// A valid session on a route meant for logged-out visitors.
    RedirectToDashboard,
}

/// The guard decision for a protected route.
pub(crate) fn protected_route_outcome(
    token: Option<&SessionToken>,
    now: OffsetDateTime,
) -> GuardOutcome {
    match token {
        Some(token) if token.is_valid_at(now) => GuardOutcome::Allow,
        _ => GuardOutcome::RedirectToLogIn,
    }
}

/// The guard decision for a public-only route (log in, register).
pub(crate) fn public_only_route_outcome(
    token: Option<&SessionToken>,
    now: OffsetDateTime,
) -> GuardOutcome {
    match token {
        Some(token) if token.is_valid_at(now) => GuardOutcome::RedirectToDashboard,
        _ => GuardOutcome::Allow,
    }
}

/// How much an active session's cookie gets extended on each request.
const SESSION_EXTENSION: Duration = Duration::minutes(5);

#[inline]
async fn auth_guard_internal(
    state: AuthState,
    request: Request,
    next: Next,
    get_redirect: impl Fn(&str) -> Response,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Redirecting to log in page.");
            return get_redirect(endpoints::LOG_IN_VIEW);
        }
    };
    let token = get_token_from_cookies(&jar).ok();

    match protected_route_outcome(token.as_ref(), OffsetDateTime::now_utc()) {
        GuardOutcome::Allow => {}
        _ => return get_redirect(endpoints::LOG_IN_VIEW),
    }

    // The match above guarantees a token is present.
    if let Some(token) = token {
        parts.extensions.insert(token);
    }
    let request = Request::from_parts(parts, body);
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_auth_cookie_duration_if_needed(jar.clone(), SESSION_EXTENSION) {
        Ok(updated_jar) => updated_jar,
        Err(err) => {
            tracing::error!("Error extending cookie duration: {err:?}. Rolling back cookie jar.");
            jar
        }
    };
    for (key, val) in jar.into_response().headers().iter() {
        if key != SET_COOKIE {
            continue;
        }

        parts.headers.append(key, val.to_owned());
    }

    Response::from_parts(parts, body)
}

/// Middleware function that checks for a valid session cookie.
/// The session token is placed into the request and the request executed
/// normally if the cookie is valid, otherwise a redirect to the log-in page
/// is returned.
///
/// **Note**: Route handlers can use the function argument
/// `Extension(session): Extension<SessionToken>` to receive the token.
///
/// **Note**: The app state must contain an `axum_extra::extract::cookie::Key`
/// for decrypting and verifying the cookie contents.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        Redirect::to(redirect_url).into_response()
    })
    .await
}

/// Same as [auth_guard] but redirects with the HX-Redirect header so that
/// HTMX form posts navigate the whole page.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    auth_guard_internal(state, request, next, |redirect_url| {
        (HxRedirect(redirect_url.to_owned()), StatusCode::OK).into_response()
    })
    .await
}

/// Middleware for the log-in and register pages: visitors with a valid
/// session are sent to the dashboard instead.
pub async fn public_only_guard(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!("Error getting cookie jar: {err:?}. Treating visitor as logged out.");
            return next.run(Request::from_parts(parts, body)).await;
        }
    };
    let token = get_token_from_cookies(&jar).ok();

    match public_only_route_outcome(token.as_ref(), OffsetDateTime::now_utc()) {
        GuardOutcome::RedirectToDashboard => {
            Redirect::to(endpoints::DASHBOARD_VIEW).into_response()
        }
        _ => next.run(Request::from_parts(parts, body)).await,
    }
}
