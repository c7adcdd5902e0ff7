//! The client boundary for the backend finance services.
//!
//! Every piece of financial data enters the application through
//! [FinanceApi]. Handlers receive the implementation as a trait object so
//! tests and the demo server can inject [MockFinanceApi](super::MockFinanceApi).

use async_trait::async_trait;

use super::models::{Account, Credentials, Insight, LogInResponse, NewUser, Transaction, User};

/// The ways a call to the backend services can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The bearer token was missing, expired, or revoked (HTTP 401).
    ///
    /// Callers must clear the session cookie and send the client back to the
    /// log-in page. That decision lives with the caller, never in the client.
    #[error("the session token was missing or rejected")]
    Unauthorized,

    /// The service understood the request but refused it, e.g. a duplicate
    /// email at registration. The message is safe to show to the user.
    #[error("the request was rejected: {0}")]
    Rejected(String),

    /// The service could not be reached or returned an unexpected response.
    /// The message is for the server logs, not the user.
    #[error("the backend service is unavailable: {0}")]
    Unavailable(String),
}

/// Shorthand for results from the client boundary.
pub type ApiResult<T> = Result<T, ApiError>;

/// One method per REST endpoint of the backend services.
///
/// All methods other than [log_in](FinanceApi::log_in) and
/// [register](FinanceApi::register) require the bearer token issued at
/// log-in.
#[async_trait]
pub trait FinanceApi: Send + Sync {
    /// POST /api/users/login
    async fn log_in(&self, credentials: &Credentials) -> ApiResult<LogInResponse>;

    /// POST /api/users/register
    async fn register(&self, new_user: &NewUser) -> ApiResult<User>;

    /// GET /api/users/profile
    async fn profile(&self, token: &str) -> ApiResult<User>;

    /// GET /api/accounts
    async fn accounts(&self, token: &str) -> ApiResult<Vec<Account>>;

    /// GET /api/transactions, optionally filtered to a single account.
    async fn transactions(&self, token: &str, account_id: Option<&str>)
    -> ApiResult<Vec<Transaction>>;

    /// GET /api/insights
    async fn insights(&self, token: &str) -> ApiResult<Vec<Insight>>;

    /// POST /api/plaid/exchange, linking a bank account via a Plaid public
    /// token.
    async fn exchange_public_token(&self, token: &str, public_token: &str) -> ApiResult<()>;
}
