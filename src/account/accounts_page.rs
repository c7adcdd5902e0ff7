//! The accounts page: asset/debt totals, one card per account, and the
//! endpoint for linking a new bank account.

use std::sync::Arc;

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState,
    alert::error_alert,
    api::{Account, ApiError, FinanceApi},
    auth::{SessionToken, force_reauthentication, force_reauthentication_hx},
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, PAGE_CONTAINER_STYLE, base, format_currency,
        loading_spinner,
    },
    navigation::NavBar,
};

use super::core::{AccountTotals, BalanceTone, balance_label, balance_tone, display_balance, summarize_accounts};

/// The state needed for the accounts page.
#[derive(Clone)]
pub struct AccountsViewState {
    /// The client for the backend account service.
    pub api: Arc<dyn FinanceApi>,
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
}

impl FromRef<AppState> for AccountsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            cookie_key: state.cookie_key.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AccountsViewState> for Key {
    fn from_ref(state: &AccountsViewState) -> Self {
        state.cookie_key.clone()
    }
}

/// Render an overview of the user's accounts.
pub async fn get_accounts_page(
    State(state): State<AccountsViewState>,
    jar: PrivateCookieJar,
    Extension(session): Extension<SessionToken>,
) -> Response {
    let accounts = match state.api.accounts(&session.bearer).await {
        Ok(accounts) => accounts,
        Err(ApiError::Unauthorized) => return force_reauthentication(jar),
        Err(error) => {
            tracing::error!("Error fetching accounts: {error}");
            return accounts_error_view().into_response();
        }
    };

    let totals = summarize_accounts(&accounts);

    accounts_view(&accounts, &totals).into_response()
}

fn accounts_error_view() -> Markup {
    let content = html! {
        (NavBar::new(endpoints::ACCOUNTS_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            (error_alert("Failed to load accounts"))
        }
    };

    base("Accounts", &content)
}

fn accounts_view(accounts: &[Account], totals: &AccountTotals) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::ACCOUNTS_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-4xl flex flex-col gap-4"
            {
                div class="flex items-center justify-between"
                {
                    h1 class="text-2xl font-bold" { "Accounts" }
                    (connect_bank_form())
                }

                (summary_cards(totals))

                div class="grid w-full gap-4 md:grid-cols-2"
                {
                    @for account in accounts {
                        (account_card(account))
                    }
                }
            }
        }
    };

    base("Accounts", &content)
}

fn summary_cards(totals: &AccountTotals) -> Markup {
    html! {
        div class="grid w-full gap-4 md:grid-cols-2"
        {
            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Total Assets" }
                p
                    data-assets-total="true"
                    class="text-2xl font-bold text-green-600 dark:text-green-400"
                {
                    (format_currency(totals.assets))
                }
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Across " (totals.asset_account_count) " accounts"
                }
            }

            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Total Debt" }
                p
                    data-debt-total="true"
                    class="text-2xl font-bold text-amber-600 dark:text-amber-400"
                {
                    (format_currency(totals.debt))
                }
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "Across " (totals.credit_account_count) " credit accounts"
                }
            }
        }
    }
}

fn account_card(account: &Account) -> Markup {
    let balance_style = match balance_tone(account) {
        BalanceTone::Positive => "text-2xl font-bold text-green-600 dark:text-green-400",
        BalanceTone::Warning => "text-2xl font-bold text-amber-600 dark:text-amber-400",
        BalanceTone::Negative => "text-2xl font-bold text-red-600 dark:text-red-400",
    };
    let transactions_url = format!(
        "{}?account={}",
        endpoints::TRANSACTIONS_VIEW,
        account.id
    );

    html! {
        div data-account-card="true" class=(CARD_STYLE)
        {
            div class="flex items-center justify-between"
            {
                h2 class="text-lg font-semibold" { (account.name) }
                span class="text-xs uppercase text-gray-500 dark:text-gray-400"
                {
                    (account.kind.label())
                }
            }

            p class="text-sm text-gray-500 dark:text-gray-400" { (balance_label(account)) }
            p class=(balance_style) { (format_currency(display_balance(account))) }

            a
                href=(transactions_url)
                class="text-sm text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400 underline"
            {
                "View Transactions"
            }
        }
    }
}

/// The sandbox token the demo backend accepts in place of a real bank link
/// handshake.
const SANDBOX_PUBLIC_TOKEN: &str = "public-sandbox-token";

fn connect_bank_form() -> Markup {
    html! {
        form
            hx-post=(endpoints::CONNECT_BANK_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#connect-bank-button"
        {
            input type="hidden" name="public_token" value=(SANDBOX_PUBLIC_TOKEN);

            button
                type="submit" id="connect-bank-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Connect Bank Account"
            }
        }
    }
}

/// The form data for linking a bank account.
#[derive(Deserialize)]
pub struct ConnectBankForm {
    /// The public token from the bank link flow, exchanged server-side for an
    /// access token.
    pub public_token: String,
}

/// Exchange a public token for a bank connection, then reload the accounts
/// page so the new accounts show up.
pub async fn post_connect_bank(
    State(state): State<AccountsViewState>,
    jar: PrivateCookieJar,
    Extension(session): Extension<SessionToken>,
    Form(form): Form<ConnectBankForm>,
) -> Response {
    match state
        .api
        .exchange_public_token(&session.bearer, &form.public_token)
        .await
    {
        Ok(()) => (
            HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(ApiError::Unauthorized) => force_reauthentication_hx(jar),
        Err(error) => {
            tracing::error!("Error connecting bank account: {error}");
            error_alert("Failed to connect bank account").into_response()
        }
    }
}


#[cfg(test)]
mod connect_bank_tests {
    use std::sync::Arc;

    use axum::{Extension, Form, extract::State, http::StatusCode};
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use axum_htmx::HX_REDIRECT;
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{api::MockFinanceApi, auth::SessionToken, endpoints};

    use super::{AccountsViewState, ConnectBankForm, SANDBOX_PUBLIC_TOKEN, post_connect_bank};

    fn get_test_state(api: MockFinanceApi) -> AccountsViewState {
        let hash = Sha512::digest(b"foobar");

        AccountsViewState {
            api: Arc::new(api),
            cookie_key: Key::from(&hash),
        }
    }

    fn session_for(token: String) -> SessionToken {
        SessionToken {
            bearer: token,
            expires_at: OffsetDateTime::now_utc() + Duration::minutes(30),
        }
    }

    #[tokio::test]
    async fn connect_bank_redirects_back_to_accounts() {
        let api = MockFinanceApi::with_demo_data();
        let token = api.issue_token();
        let state = get_test_state(api);
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = post_connect_bank(
            State(state),
            jar,
            Extension(session_for(token)),
            Form(ConnectBankForm {
                public_token: SANDBOX_PUBLIC_TOKEN.to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT).unwrap(),
            endpoints::ACCOUNTS_VIEW
        );
    }

    #[tokio::test]
    async fn connect_bank_with_stale_token_forces_reauthentication() {
        let state = get_test_state(MockFinanceApi::with_demo_data());
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = post_connect_bank(
            State(state),
            jar,
            Extension(session_for("not-a-real-token".to_string())),
            Form(ConnectBankForm {
                public_token: SANDBOX_PUBLIC_TOKEN.to_string(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(HX_REDIRECT).unwrap(),
            endpoints::LOG_IN_VIEW
        );
    }
}
