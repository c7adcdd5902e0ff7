//! Aureum is a web app for keeping an eye on your personal finances:
//! accounts, transactions, and the insights derived from them.
//!
//! This library serves HTML pages directly and talks to the backend finance
//! services through a pluggable client.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::response::{IntoResponse, Response};
use axum_server::Handle;
use tokio::signal;

mod account;
mod alert;
pub mod api;
mod app_state;
mod auth;
mod dashboard;
mod endpoints;
mod html;
mod insight;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod pagination;
mod routing;
#[cfg(test)]
mod test_utils;
mod transaction;

pub use app_state::AppState;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;

use crate::{internal_server_error::InternalServerError, not_found::get_404_not_found_response};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The auth cookie could not be decrypted or parsed.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The auth cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The session in the auth cookie has passed its expiry time.
    #[error("the session has expired")]
    SessionExpired,

    /// A value could not be serialized for storage in a cookie.
    #[error("could not serialize as JSON: {0}")]
    Serialization(String),

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}
