//! The routes for displaying the log-in page and handling log-in requests.
//! The lower level cookie and token logic lives in the sibling modules.

use std::sync::Arc;

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState,
    api::{ApiError, Credentials, FinanceApi},
    endpoints,
    html::{base, email_input, loading_spinner, log_in_register, password_input},
};

use super::cookie::{invalidate_auth_cookie, set_auth_cookie};

fn log_in_form(email: &str, error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (email_input(email, None))
            (password_input("", error_message))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            button
                type="submit" id="submit-button" tabindex="0"
                class="w-full px-4 py-2 bg-blue-500 dark:bg-blue-600 disabled:bg-blue-700
                    hover:enabled:bg-blue-600 hover:enabled:dark:bg-blue-700 text-white rounded"
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Log in"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Don't have an account? "
                a
                    href=(endpoints::REGISTER_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Register here"
                }
            }
        }
    }
}

/// Display the log-in page.
pub async fn get_log_in_page() -> Response {
    let log_in_form = log_in_form("", None);
    let content = log_in_register("Log in to your account", &log_in_form);
    base("Log In", &content).into_response()
}

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to perform a log-in.
#[derive(Clone)]
pub struct LogInState {
    /// The client for the backend auth service.
    pub api: Arc<dyn FinanceApi>,
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for LogInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";
pub const SERVICE_UNAVAILABLE_ERROR_MSG: &str =
    "The service is temporarily unavailable. Please try again later.";

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in, the bearer token from the auth service is stored in
/// the auth cookie and the client is redirected to the dashboard page.
/// Otherwise, the form is returned with an error message explaining the
/// problem.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let credentials = Credentials {
        email: user_data.email.clone(),
        password: user_data.password,
    };

    let log_in_response = match state.api.log_in(&credentials).await {
        Ok(log_in_response) => log_in_response,
        Err(ApiError::Unauthorized) => {
            return log_in_form(&user_data.email, Some(INVALID_CREDENTIALS_ERROR_MSG))
                .into_response();
        }
        Err(error) => {
            tracing::error!("Error logging in against the auth service: {error}");
            return log_in_form(&user_data.email, Some(SERVICE_UNAVAILABLE_ERROR_MSG))
                .into_response();
        }
    };

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    set_auth_cookie(jar.clone(), &log_in_response.token, cookie_duration)
        .map(|updated_jar| {
            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                updated_jar,
            )
        })
        .map_err(|err| {
            tracing::error!("Error setting auth cookie: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
        })
        .into_response()
}

/// The raw data entered by the user in the log-in form.
///
/// The password is stored as a plain string. There is no need for validation
/// here since the auth service verifies the credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Email entered during log-in.
    pub email: String,

    /// Password entered during log-in.
    pub password: String,

    /// Whether to extend the initial auth cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set
    /// (see the [MDN docs](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/input/checkbox#value_2)).
    /// The `Some` variant should be interpreted as `true` irregardless of the
    /// string value, and the `None` variant should be interpreted as `false`.
    pub remember_me: Option<String>,
}

#[cfg(test)]
mod log_in_page_tests {
    use std::collections::HashMap;

    use axum::http::{StatusCode, header::CONTENT_TYPE};

    use crate::{
        endpoints,
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::get_log_in_page;

    #[tokio::test]
    async fn log_in_page_displays_form() {
        let response = get_log_in_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .get(CONTENT_TYPE)
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with("text/html")
        );

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form_selector = scraper::Selector::parse("form").unwrap();
        let forms = document.select(&form_selector).collect::<Vec<_>>();
        assert_eq!(forms.len(), 1, "want 1 form, got {}", forms.len());
        let form = forms.first().unwrap();
        let hx_post = form.value().attr("hx-post");
        assert_eq!(
            hx_post,
            Some(endpoints::LOG_IN_API),
            "want form with attribute hx-post=\"{}\", got {:?}",
            endpoints::LOG_IN_API,
            hx_post
        );

        let mut expected_form_elements: HashMap<&str, Vec<&str>> = HashMap::new();
        expected_form_elements.insert("input", vec!["email", "password"]);
        expected_form_elements.insert("button", vec!["submit"]);

        for (tag, element_types) in expected_form_elements {
            for element_type in element_types {
                let selector_string = format!("{tag}[type={element_type}]");
                let input_selector = scraper::Selector::parse(&selector_string).unwrap();
                let inputs = form.select(&input_selector).collect::<Vec<_>>();
                assert_eq!(
                    inputs.len(),
                    1,
                    "want 1 {element_type} {tag}, got {}",
                    inputs.len()
                );
            }
        }

        let register_link_selector = scraper::Selector::parse("a[href]").unwrap();
        let links = form.select(&register_link_selector).collect::<Vec<_>>();
        assert_eq!(links.len(), 1, "want 1 link, got {}", links.len());
        assert_eq!(
            links[0].value().attr("href"),
            Some(endpoints::REGISTER_VIEW),
        );
    }
}
