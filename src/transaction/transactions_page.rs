//! Defines the route handler for the page that displays transactions as a
//! filterable, paginated table.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use serde::{Deserialize, Deserializer};

use crate::{
    AppState,
    alert::error_alert,
    api::{ApiError, FinanceApi, Transaction},
    auth::{SessionToken, force_reauthentication},
    endpoints,
    html::{
        CARD_STYLE, CATEGORY_BADGE_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
        format_signed_currency,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, PaginationIndicator, create_pagination_indicators},
};

use super::query::{
    KindFilter, TransactionFilter, TransactionPage, distinct_categories, run_query,
};

/// The raw query params from the transactions page URL.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsParams {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub kind: Option<String>,
    pub page: Option<u64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub account: Option<String>,
}

/// Treat `?category=` the same as a missing param so that submitting the
/// filter form with "All" selected does not filter on an empty string.
fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|value| !value.is_empty()))
}

/// URL encoding helper for transactions query params.
///
/// Used to build the pagination links so that moving between pages keeps the
/// active filters.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TransactionsQuery {
    search: String,
    category: Option<String>,
    kind: KindFilter,
    account: Option<String>,
    page: u64,
}

impl TransactionsQuery {
    fn new(filter: &TransactionFilter, account: Option<&str>, page: u64) -> Self {
        Self {
            search: filter.search.clone(),
            category: filter.category.clone(),
            kind: filter.kind,
            account: account.map(str::to_owned),
            page,
        }
    }

    pub(crate) fn with_page(&self, page: u64) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    pub(crate) fn to_url(&self, route: &str) -> String {
        let mut params: Vec<(&str, String)> = Vec::new();

        if !self.search.is_empty() {
            params.push(("search", self.search.clone()));
        }
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        if let Some(kind) = self.kind.as_query_value() {
            params.push(("kind", kind.to_owned()));
        }
        if let Some(account) = &self.account {
            params.push(("account", account.clone()));
        }
        if self.page > 1 {
            params.push(("page", self.page.to_string()));
        }

        if params.is_empty() {
            return route.to_owned();
        }

        match serde_urlencoded::to_string(&params) {
            Ok(query) => format!("{route}?{query}"),
            Err(error) => {
                tracing::error!("Could not encode transactions query: {error}");
                route.to_owned()
            }
        }
    }
}

/// The state needed for the transactions page.
#[derive(Clone)]
pub struct TransactionsViewState {
    /// The client for the backend transaction service.
    pub api: Arc<dyn FinanceApi>,
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// Page size and indicator window for the transaction table.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            cookie_key: state.cookie_key.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<TransactionsViewState> for Key {
    fn from_ref(state: &TransactionsViewState) -> Self {
        state.cookie_key.clone()
    }
}

/// Render an overview of the user's transactions.
///
/// A backend 401 means the bearer token is stale, so the session is cleared
/// and the client sent back to the log-in page.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    jar: PrivateCookieJar,
    Extension(session): Extension<SessionToken>,
    Query(params): Query<TransactionsParams>,
) -> Response {
    let transactions = match state
        .api
        .transactions(&session.bearer, params.account.as_deref())
        .await
    {
        Ok(transactions) => transactions,
        Err(ApiError::Unauthorized) => return force_reauthentication(jar),
        Err(error) => {
            tracing::error!("Error fetching transactions: {error}");
            return transactions_error_view().into_response();
        }
    };

    let filter = TransactionFilter {
        search: params.search.unwrap_or_default(),
        category: params.category,
        kind: KindFilter::from_query_value(params.kind.as_deref()),
    };
    let page = run_query(
        &transactions,
        &filter,
        params.page.unwrap_or(1),
        state.pagination_config.page_size,
    );
    let categories = distinct_categories(&transactions);
    let query = TransactionsQuery::new(&filter, params.account.as_deref(), page.curr_page);
    let indicators = create_pagination_indicators(
        page.curr_page,
        page.page_count,
        state.pagination_config.max_pages,
    );

    transactions_view(&page, &filter, &categories, &query, &indicators).into_response()
}

fn transactions_error_view() -> Markup {
    let content = html! {
        (NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            (error_alert("Failed to load transactions"))
        }
    };

    base("Transactions", &content)
}

fn transactions_view(
    page: &TransactionPage,
    filter: &TransactionFilter,
    categories: &[String],
    query: &TransactionsQuery,
    indicators: &[PaginationIndicator],
) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-4xl flex flex-col gap-4"
            {
                h1 class="text-2xl font-bold" { "Transactions" }

                (summary_cards(page))
                (filter_form(filter, categories, query))
                (transaction_table(&page.rows))

                @if page.page_count > 1 {
                    (pagination_nav(query, indicators))
                }
            }
        }
    };

    base("Transactions", &content)
}

fn summary_cards(page: &TransactionPage) -> Markup {
    html! {
        div class="grid w-full gap-4 md:grid-cols-2"
        {
            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Total Income" }
                p
                    data-income-total="true"
                    class="text-2xl font-bold text-green-600 dark:text-green-400"
                {
                    (format_signed_currency(page.income))
                }
            }

            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Total Expenses" }
                p
                    data-expenses-total="true"
                    class="text-2xl font-bold text-red-600 dark:text-red-400"
                {
                    (format_currency(-page.expenses))
                }
            }
        }
    }
}

/// The filter form deliberately has no page input: changing any filter
/// submits without a page param, which lands the user back on page one.
fn filter_form(filter: &TransactionFilter, categories: &[String], query: &TransactionsQuery) -> Markup {
    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="flex flex-col gap-2 md:flex-row md:items-end"
        {
            @if let Some(account) = &query.account {
                input type="hidden" name="account" value=(account);
            }

            input
                type="search"
                name="search"
                id="search"
                placeholder="Search transactions"
                value=(filter.search)
                class=(FORM_TEXT_INPUT_STYLE);

            select name="category" id="category" class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" { "All Categories" }
                @for category in categories {
                    option
                        value=(category)
                        selected[filter.category.as_deref() == Some(category)]
                    {
                        (category)
                    }
                }
            }

            select name="kind" id="kind" class=(FORM_TEXT_INPUT_STYLE)
            {
                option value="" { "All Types" }
                option value="debit" selected[filter.kind == KindFilter::Debit] { "Expenses" }
                option value="credit" selected[filter.kind == KindFilter::Credit] { "Income" }
            }

            button
                type="submit"
                class="px-4 py-2 bg-blue-500 dark:bg-blue-600 hover:bg-blue-600
                    hover:dark:bg-blue-700 text-white rounded"
            {
                "Apply"
            }
        }
    }
}

fn transaction_table(rows: &[Transaction]) -> Markup {
    html! {
        div class="relative overflow-x-auto shadow-md rounded w-full"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                    }
                }

                tbody
                {
                    @if rows.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td
                                data-empty-state="true"
                                colspan="4"
                                class="px-6 py-8 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No transactions found"
                            }
                        }
                    }

                    @for transaction in rows {
                        (transaction_row(transaction))
                    }
                }
            }
        }
    }
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let amount_style = if transaction.amount < 0.0 {
        "px-6 py-4 font-medium text-red-600 dark:text-red-400"
    } else {
        "px-6 py-4 font-medium text-green-600 dark:text-green-400"
    };

    html! {
        tr data-transaction-row="true" class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.date) }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE) { (transaction.category) }
            }
            td class=(amount_style) { (format_signed_currency(transaction.amount)) }
        }
    }
}

fn pagination_nav(query: &TransactionsQuery, indicators: &[PaginationIndicator]) -> Markup {
    let page_link_style = "flex items-center justify-center px-3 h-8 leading-tight \
        text-gray-500 bg-white border border-gray-300 hover:bg-gray-100 \
        hover:text-gray-700 dark:bg-gray-800 dark:border-gray-700 \
        dark:text-gray-400 dark:hover:bg-gray-700 dark:hover:text-white";
    let curr_page_style = "flex items-center justify-center px-3 h-8 leading-tight \
        text-blue-600 border border-gray-300 bg-blue-50 hover:bg-blue-100 \
        hover:text-blue-700 dark:bg-gray-700 dark:border-gray-700 dark:text-white";

    let page_url = |page: u64| query.with_page(page).to_url(endpoints::TRANSACTIONS_VIEW);

    html! {
        nav class="pagination" aria-label="Transaction pages"
        {
            ul class="pagination inline-flex -space-x-px text-sm"
            {
                @for indicator in indicators {
                    li
                    {
                        @match indicator {
                            PaginationIndicator::BackButton(page) => {
                                a href=(page_url(*page)) class=(page_link_style) { "Previous" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a href=(page_url(*page)) class=(page_link_style) { "Next" }
                            }
                            PaginationIndicator::Page(page) => {
                                a href=(page_url(*page)) class=(page_link_style) { (page) }
                            }
                            PaginationIndicator::CurrPage(page) => {
                                a
                                    href=(page_url(*page))
                                    aria-current="page"
                                    class=(curr_page_style)
                                {
                                    (page)
                                }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class=(page_link_style) { "…" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod transactions_page_tests {
    use std::sync::Arc;

    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
        response::Response,
    };
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use scraper::{ElementRef, Html, Selector};
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        api::MockFinanceApi,
        auth::SessionToken,
        endpoints,
        pagination::PaginationConfig,
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::{TransactionsParams, TransactionsViewState, get_transactions_page};

    fn get_test_state(api: MockFinanceApi) -> TransactionsViewState {
        let hash = Sha512::digest(b"foobar");

        TransactionsViewState {
            api: Arc::new(api),
            cookie_key: Key::from(&hash),
            pagination_config: PaginationConfig::default(),
        }
    }

    fn session_for(token: String) -> SessionToken {
        SessionToken {
            bearer: token,
            expires_at: OffsetDateTime::now_utc() + Duration::minutes(30),
        }
    }

    async fn render_page(api: MockFinanceApi, params: TransactionsParams) -> Response {
        let token = api.issue_token();
        let state = get_test_state(api);
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        get_transactions_page(
            State(state),
            jar,
            Extension(session_for(token)),
            Query(params),
        )
        .await
    }

    #[tokio::test]
    async fn transactions_page_displays_first_page_of_rows() {
        let response = render_page(
            MockFinanceApi::with_demo_data(),
            TransactionsParams::default(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let rows = transaction_rows(&html);
        assert_eq!(rows.len(), 10, "want 10 rows on the first page");
        assert_pagination_nav_present(&html);
    }

    #[tokio::test]
    async fn transactions_page_clamps_out_of_range_page() {
        let response = render_page(
            MockFinanceApi::with_demo_data(),
            TransactionsParams {
                page: Some(99),
                ..Default::default()
            },
        )
        .await;

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        // 15 demo transactions at 10 per page leaves 5 on the last page.
        let rows = transaction_rows(&html);
        assert_eq!(rows.len(), 5, "want the last page of rows");

        let current_selector = Selector::parse("[aria-current='page']").unwrap();
        let current = html
            .select(&current_selector)
            .next()
            .expect("No current page indicator found");
        assert_eq!(current.text().collect::<String>().trim(), "2");
    }

    #[tokio::test]
    async fn transactions_page_filters_by_search() {
        let response = render_page(
            MockFinanceApi::with_demo_data(),
            TransactionsParams {
                search: Some("netflix".to_string()),
                ..Default::default()
            },
        )
        .await;

        let html = parse_html_document(response).await;
        let rows = transaction_rows(&html);
        assert_eq!(rows.len(), 1, "want one row matching 'netflix'");
        let row_text = rows[0].text().collect::<String>();
        assert!(row_text.contains("Netflix"), "got row {row_text}");
    }

    #[tokio::test]
    async fn transactions_page_shows_empty_state() {
        let response = render_page(
            MockFinanceApi::with_demo_data(),
            TransactionsParams {
                search: Some("does not match anything".to_string()),
                ..Default::default()
            },
        )
        .await;

        let html = parse_html_document(response).await;
        let empty_selector = Selector::parse("tbody tr td[data-empty-state='true']").unwrap();
        let empty_cell = html
            .select(&empty_selector)
            .next()
            .expect("No empty-state row found");
        assert_eq!(
            empty_cell.value().attr("colspan"),
            Some("4"),
            "Empty-state cell should span the table"
        );
    }

    #[tokio::test]
    async fn transactions_page_filter_form_resets_page() {
        let response = render_page(
            MockFinanceApi::with_demo_data(),
            TransactionsParams {
                page: Some(2),
                ..Default::default()
            },
        )
        .await;

        let html = parse_html_document(response).await;
        let form_selector = Selector::parse("form[method='get']").unwrap();
        let form = html
            .select(&form_selector)
            .next()
            .expect("No filter form found");

        let page_input_selector = Selector::parse("input[name='page']").unwrap();
        assert!(
            form.select(&page_input_selector).next().is_none(),
            "Filter form must not carry the page param"
        );
    }

    #[tokio::test]
    async fn transactions_page_shows_income_and_expense_totals() {
        let response = render_page(
            MockFinanceApi::with_demo_data(),
            TransactionsParams::default(),
        )
        .await;

        let html = parse_html_document(response).await;

        let income_selector = Selector::parse("[data-income-total='true']").unwrap();
        let income = html
            .select(&income_selector)
            .next()
            .expect("No income total found");
        assert_eq!(income.text().collect::<String>().trim(), "+$3,000.00");

        let expenses_selector = Selector::parse("[data-expenses-total='true']").unwrap();
        let expenses = html
            .select(&expenses_selector)
            .next()
            .expect("No expenses total found");
        let expenses_text = expenses.text().collect::<String>();
        assert!(
            expenses_text.trim().starts_with("-$"),
            "Expenses should render as a negative amount, got {expenses_text}"
        );
    }

    #[tokio::test]
    async fn transactions_page_passes_account_filter_to_backend() {
        let response = render_page(
            MockFinanceApi::with_demo_data(),
            TransactionsParams {
                account: Some("3".to_string()),
                ..Default::default()
            },
        )
        .await;

        let html = parse_html_document(response).await;
        let rows = transaction_rows(&html);
        assert_eq!(rows.len(), 2, "want only the rows for account 3");
    }

    #[tokio::test]
    async fn stale_token_redirects_to_log_in() {
        let state = get_test_state(MockFinanceApi::with_demo_data());
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = get_transactions_page(
            State(state),
            jar,
            Extension(session_for("not-a-real-token".to_string())),
            Query(TransactionsParams::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::LOG_IN_VIEW
        );
        assert!(
            response.headers().get("set-cookie").is_some(),
            "The stale session cookie should be cleared"
        );
    }

    fn transaction_rows(html: &Html) -> Vec<ElementRef<'_>> {
        let row_selector = Selector::parse("tbody tr[data-transaction-row='true']").unwrap();
        html.select(&row_selector).collect()
    }

    #[track_caller]
    fn assert_pagination_nav_present(html: &Html) {
        let nav_selector = Selector::parse("nav.pagination > ul.pagination").unwrap();
        let nav = html
            .select(&nav_selector)
            .next()
            .expect("No pagination nav found");

        let current_selector = Selector::parse("[aria-current='page']").unwrap();
        nav.select(&current_selector)
            .next()
            .expect("Pagination nav should mark the current page");
    }
}
