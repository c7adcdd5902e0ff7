//! Implements a struct that holds the state of the web server.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{api::FinanceApi, auth::DEFAULT_COOKIE_DURATION, pagination::PaginationConfig};

/// The state of the web server.
#[derive(Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,

    /// The client for the backend finance services.
    pub api: Arc<dyn FinanceApi>,
}

impl AppState {
    /// Create a new [AppState] with the given backend client.
    pub fn new(
        api: Arc<dyn FinanceApi>,
        cookie_secret: &str,
        pagination_config: PaginationConfig,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            pagination_config,
            api,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret` string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
