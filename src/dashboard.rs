//! The dashboard route: an overview of balances, recent spending, and the
//! top insights.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};

use crate::{
    AppState,
    account::summarize_accounts,
    alert::error_alert,
    api::{ApiError, FinanceApi, Insight, Transaction, User},
    auth::{SessionToken, force_reauthentication},
    endpoints,
    html::{CARD_STYLE, PAGE_CONTAINER_STYLE, base, format_currency, format_signed_currency, link},
    insight::{insight_icon, priority_chip_class},
    navigation::NavBar,
};

/// How many transactions the recent activity list shows.
const RECENT_TRANSACTION_COUNT: usize = 5;
/// How many insights the dashboard previews before linking to the full page.
const INSIGHT_PREVIEW_COUNT: usize = 3;

/// The state needed for the dashboard page.
#[derive(Clone)]
pub struct DashboardState {
    /// The client for the backend finance services.
    pub api: Arc<dyn FinanceApi>,
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            cookie_key: state.cookie_key.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<DashboardState> for Key {
    fn from_ref(state: &DashboardState) -> Self {
        state.cookie_key.clone()
    }
}

/// Display a page with an overview of the user's data.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    jar: PrivateCookieJar,
    Extension(session): Extension<SessionToken>,
) -> Response {
    let token = &session.bearer;

    let (profile, accounts, transactions, insights) = match tokio::try_join!(
        state.api.profile(token),
        state.api.accounts(token),
        state.api.transactions(token, None),
        state.api.insights(token),
    ) {
        Ok(data) => data,
        Err(ApiError::Unauthorized) => return force_reauthentication(jar),
        Err(error) => {
            tracing::error!("Error fetching dashboard data: {error}");
            return dashboard_error_view().into_response();
        }
    };

    dashboard_view(&profile, &accounts, &transactions, &insights).into_response()
}

fn dashboard_error_view() -> Markup {
    let content = html! {
        (NavBar::new(endpoints::DASHBOARD_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            (error_alert("Failed to load dashboard data"))
        }
    };

    base("Dashboard", &content)
}

fn dashboard_view(
    user: &User,
    accounts: &[crate::api::Account],
    transactions: &[Transaction],
    insights: &[Insight],
) -> Markup {
    let totals = summarize_accounts(accounts);
    let spending = total_spending(transactions);
    let by_category = spending_by_category(transactions);
    let recent = recent_transactions(transactions, RECENT_TRANSACTION_COUNT);

    let content = html! {
        (NavBar::new(endpoints::DASHBOARD_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-4xl flex flex-col gap-4"
            {
                h1 class="text-2xl font-bold" { "Welcome back, " (user.first_name) "!" }

                div class="grid w-full gap-4 md:grid-cols-3"
                {
                    div class=(CARD_STYLE)
                    {
                        p class="text-sm text-gray-500 dark:text-gray-400" { "Total Balance" }
                        p
                            data-total-balance="true"
                            class="text-2xl font-bold text-green-600 dark:text-green-400"
                        {
                            (format_currency(totals.assets))
                        }
                    }

                    div class=(CARD_STYLE)
                    {
                        p class="text-sm text-gray-500 dark:text-gray-400" { "Credit Used" }
                        p
                            data-credit-used="true"
                            class="text-2xl font-bold text-amber-600 dark:text-amber-400"
                        {
                            (format_currency(totals.debt))
                        }
                    }

                    div class=(CARD_STYLE)
                    {
                        p class="text-sm text-gray-500 dark:text-gray-400" { "Monthly Spending" }
                        p
                            data-monthly-spending="true"
                            class="text-2xl font-bold text-red-600 dark:text-red-400"
                        {
                            (format_currency(spending))
                        }
                    }
                }

                div class="grid w-full gap-4 md:grid-cols-2"
                {
                    (spending_by_category_card(&by_category))
                    (recent_transactions_card(&recent))
                }

                (insights_preview(insights))
            }
        }
    };

    base("Dashboard", &content)
}

fn spending_by_category_card(by_category: &[(String, f64)]) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold mb-2" { "Spending by Category" }

            @if by_category.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400" { "No spending yet" }
            }

            ul class="flex flex-col gap-1"
            {
                @for (category, amount) in by_category {
                    li
                        data-category-row=(category)
                        class="flex justify-between text-sm"
                    {
                        span { (category) }
                        span class="font-medium" { (format_currency(*amount)) }
                    }
                }
            }
        }
    }
}

fn recent_transactions_card(recent: &[Transaction]) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold mb-2" { "Recent Transactions" }

            @if recent.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400" { "No transactions yet" }
            }

            ul class="flex flex-col gap-1"
            {
                @for transaction in recent {
                    li
                        data-recent-transaction="true"
                        class="flex justify-between text-sm"
                    {
                        span { (transaction.description) }
                        span class="font-medium" { (format_signed_currency(transaction.amount)) }
                    }
                }
            }

            p class="mt-2 text-sm"
            {
                (link(endpoints::TRANSACTIONS_VIEW, "View all transactions"))
            }
        }
    }
}

fn insights_preview(insights: &[Insight]) -> Markup {
    html! {
        div class=(CARD_STYLE)
        {
            h2 class="text-lg font-semibold mb-2" { "Insights" }

            ul class="flex flex-col gap-2"
            {
                @for insight in insights.iter().take(INSIGHT_PREVIEW_COUNT) {
                    li
                        data-insight-preview="true"
                        class="flex items-center justify-between text-sm"
                    {
                        span
                        {
                            span aria-hidden="true" class="mr-2 font-bold text-blue-600 dark:text-blue-500"
                            {
                                (insight_icon(insight.kind))
                            }
                            (insight.title)
                        }

                        span class=(priority_chip_class(insight.priority)) { (insight.priority.label()) }
                    }
                }
            }

            p class="mt-2 text-sm"
            {
                (link(endpoints::INSIGHTS_VIEW, "View all insights"))
            }
        }
    }
}

/// The total spent across all debits, as a positive number.
fn total_spending(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|transaction| transaction.amount < 0.0)
        .map(|transaction| -transaction.amount)
        .sum()
}

/// Debit totals grouped by category, largest first.
fn spending_by_category(transactions: &[Transaction]) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();

    for transaction in transactions {
        if transaction.amount >= 0.0 {
            continue;
        }

        match totals
            .iter_mut()
            .find(|(category, _)| *category == transaction.category)
        {
            Some((_, amount)) => *amount += -transaction.amount,
            None => totals.push((transaction.category.clone(), -transaction.amount)),
        }
    }

    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals
}

/// The `count` most recent transactions by date.
fn recent_transactions(transactions: &[Transaction], count: usize) -> Vec<Transaction> {
    let mut transactions = transactions.to_vec();
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
    transactions.truncate(count);
    transactions
}
