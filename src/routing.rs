//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    extract::FromRef,
    middleware,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    account::{get_accounts_page, post_connect_bank},
    auth::{
        AuthState, auth_guard, auth_guard_hx, get_log_in_page, get_log_out, get_register_page,
        post_log_in, post_register, public_only_guard,
    },
    dashboard::get_dashboard_page,
    endpoints,
    insight::get_insights_page,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    transaction::get_transactions_page,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let auth_state = AuthState::from_ref(&state);

    // Visitors with a valid session get bounced to the dashboard from these.
    let public_only_routes = Router::new()
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            public_only_guard,
        ));

    let unprotected_routes = Router::new()
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::REGISTER_API, post(post_register))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::ACCOUNTS_VIEW, get(get_accounts_page))
        .route(endpoints::INSIGHTS_VIEW, get(get_insights_page))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_guard,
        ));

    // POST routes need the HX-Redirect header for auth redirects to work
    // properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(endpoints::CONNECT_BANK_API, post(post_connect_bank))
            .layer(middleware::from_fn_with_state(auth_state, auth_guard_hx)),
    );

    protected_routes
        .merge(public_only_routes)
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
