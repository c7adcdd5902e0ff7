//! The application routes.

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying a user's transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for displaying a user's accounts.
pub const ACCOUNTS_VIEW: &str = "/accounts";
/// The page for displaying financial insights.
pub const INSIGHTS_VIEW: &str = "/insights";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for registering a new user.
pub const REGISTER_API: &str = "/api/register";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route for exchanging a Plaid public token to link a bank account.
pub const CONNECT_BANK_API: &str = "/api/connect_bank";
