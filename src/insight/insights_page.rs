//! The insights page: one card per insight from the backend, with the
//! priority chip and call to action.

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
    alert::error_alert,
    api::{ApiError, FinanceApi, Insight},
    auth::{SessionToken, force_reauthentication},
    endpoints,
    html::{CARD_STYLE, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
};

use super::core::{insight_icon, priority_chip_class};

/// The state needed for the insights page.
#[derive(Clone)]
pub struct InsightsViewState {
    /// The client for the backend insight service.
    pub api: Arc<dyn FinanceApi>,
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
}

impl FromRef<AppState> for InsightsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            cookie_key: state.cookie_key.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<InsightsViewState> for Key {
    fn from_ref(state: &InsightsViewState) -> Self {
        state.cookie_key.clone()
    }
}

/// Render the user's financial insights.
pub async fn get_insights_page(
    State(state): State<InsightsViewState>,
    jar: PrivateCookieJar,
    Extension(session): Extension<SessionToken>,
) -> Response {
    let insights = match state.api.insights(&session.bearer).await {
        Ok(insights) => insights,
        Err(ApiError::Unauthorized) => return force_reauthentication(jar),
        Err(error) => {
            tracing::error!("Error fetching insights: {error}");
            return insights_error_view().into_response();
        }
    };

    insights_view(&insights).into_response()
}

fn insights_error_view() -> Markup {
    let content = html! {
        (NavBar::new(endpoints::INSIGHTS_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            (error_alert("Failed to load insights"))
        }
    };

    base("Insights", &content)
}

fn insights_view(insights: &[Insight]) -> Markup {
    let content = html! {
        (NavBar::new(endpoints::INSIGHTS_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-4xl flex flex-col gap-4"
            {
                h1 class="text-2xl font-bold" { "Insights" }

                @if insights.is_empty() {
                    p
                        data-empty-state="true"
                        class="text-gray-500 dark:text-gray-400"
                    {
                        "No insights yet. Check back once you have more activity."
                    }
                }

                @for insight in insights {
                    (insight_card(insight))
                }
            }
        }
    };

    base("Insights", &content)
}

fn insight_card(insight: &Insight) -> Markup {
    html! {
        div data-insight-card="true" class=(CARD_STYLE)
        {
            div class="flex items-center justify-between"
            {
                div class="flex items-center gap-2"
                {
                    span
                        data-insight-icon="true"
                        aria-hidden="true"
                        class="text-xl font-bold text-blue-600 dark:text-blue-500"
                    {
                        (insight_icon(insight.kind))
                    }

                    h2 class="text-lg font-semibold" { (insight.title) }
                }

                span
                    data-priority-chip=(insight.priority.label())
                    class=(priority_chip_class(insight.priority))
                {
                    (insight.priority.label())
                }
            }

            p class="text-sm text-gray-500 dark:text-gray-400" { (insight.description) }

            @if insight.actionable {
                button
                    type="button"
                    data-insight-cta="true"
                    class="self-start px-4 py-2 text-sm bg-blue-500 dark:bg-blue-600
                        hover:bg-blue-600 hover:dark:bg-blue-700 text-white rounded"
                {
                    "Take Action"
                }
            }
        }
    }
}

#[cfg(test)]
mod insights_page_tests {
    use std::sync::Arc;

    use axum::{Extension, extract::State, http::StatusCode, response::Response};
    use axum_extra::extract::{PrivateCookieJar, cookie::Key};
    use scraper::Selector;
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime};

    use crate::{
        api::MockFinanceApi,
        auth::SessionToken,
        endpoints,
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::{InsightsViewState, get_insights_page};

    fn get_test_state(api: MockFinanceApi) -> InsightsViewState {
        let hash = Sha512::digest(b"foobar");

        InsightsViewState {
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

    async fn render_page(api: MockFinanceApi) -> Response {
        let token = api.issue_token();
        let state = get_test_state(api);
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        get_insights_page(State(state), jar, Extension(session_for(token))).await
    }

    #[tokio::test]
    async fn insights_page_shows_one_card_per_insight() {
        let response = render_page(MockFinanceApi::with_demo_data()).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let card_selector = Selector::parse("[data-insight-card='true']").unwrap();
        let cards: Vec<_> = html.select(&card_selector).collect();
        assert_eq!(cards.len(), 5, "want one card per demo insight");
    }

    #[tokio::test]
    async fn priority_chips_use_the_priority_colours() {
        let response = render_page(MockFinanceApi::with_demo_data()).await;
        let html = parse_html_document(response).await;

        let high_selector = Selector::parse("[data-priority-chip='High']").unwrap();
        let high = html
            .select(&high_selector)
            .next()
            .expect("No high priority chip found");
        assert!(
            high.value().attr("class").unwrap().contains("text-red-800"),
            "High priority should use the red chip"
        );

        let medium_selector = Selector::parse("[data-priority-chip='Medium']").unwrap();
        let medium = html
            .select(&medium_selector)
            .next()
            .expect("No medium priority chip found");
        assert!(
            medium.value().attr("class").unwrap().contains("text-amber-800"),
            "Medium priority should use the amber chip"
        );

        let low_selector = Selector::parse("[data-priority-chip='Low']").unwrap();
        let low = html
            .select(&low_selector)
            .next()
            .expect("No low priority chip found");
        assert!(
            low.value().attr("class").unwrap().contains("text-green-800"),
            "Low priority should use the green chip"
        );
    }

    #[tokio::test]
    async fn only_actionable_insights_get_a_call_to_action() {
        let response = render_page(MockFinanceApi::with_demo_data()).await;
        let html = parse_html_document(response).await;

        let card_selector = Selector::parse("[data-insight-card='true']").unwrap();
        let cta_selector = Selector::parse("[data-insight-cta='true']").unwrap();

        for card in html.select(&card_selector) {
            let card_text = card.text().collect::<String>();
            let has_cta = card.select(&cta_selector).next().is_some();

            // "Excellent Savings Progress" is the one non-actionable demo insight.
            if card_text.contains("Excellent Savings Progress") {
                assert!(!has_cta, "Non-actionable insight should not have a CTA");
            } else {
                assert!(has_cta, "Actionable insight should have a CTA: {card_text}");
            }
        }
    }

    #[tokio::test]
    async fn empty_insights_show_the_empty_state() {
        let api = MockFinanceApi::empty();
        let token = api.issue_token();
        let state = get_test_state(api);
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = get_insights_page(State(state), jar, Extension(session_for(token))).await;

        let html = parse_html_document(response).await;
        let empty_selector = Selector::parse("[data-empty-state='true']").unwrap();
        html.select(&empty_selector)
            .next()
            .expect("No empty state found");
    }

    #[tokio::test]
    async fn stale_token_redirects_to_log_in() {
        let state = get_test_state(MockFinanceApi::with_demo_data());
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = get_insights_page(
            State(state),
            jar,
            Extension(session_for("not-a-real-token".to_string())),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::LOG_IN_VIEW
        );
    }
}
