//! The registration page for creating a new account with the auth service.

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
    api::{ApiError, Credentials, FinanceApi, NewUser},
    endpoints,
    html::{
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base, email_input, loading_spinner,
        log_in_register, password_input, text_input,
    },
    internal_server_error::get_internal_server_error_redirect,
};

use super::cookie::set_auth_cookie;

fn confirm_password_input(error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                autofocus[error_message.is_some()]
            ;

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }

    }
}

fn registration_form(
    form_data: &RegisterForm,
    email_error_message: Option<&str>,
    confirm_password_error_message: Option<&str>,
) -> Markup {
    html! {
        form
            hx-post=(endpoints::REGISTER_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (text_input("first_name", "first-name", "First Name", &form_data.first_name))
            (text_input("last_name", "last-name", "Last Name", &form_data.last_name))
            (email_input(&form_data.email, email_error_message))
            (password_input("", None))
            (confirm_password_input(confirm_password_error_message))

            button
                type="submit" id="submit-button" tabindex="0"
                class="w-full px-4 py-2 bg-blue-500 dark:bg-blue-600 disabled:bg-blue-700
                    hover:enabled:bg-blue-600 hover:enabled:dark:bg-blue-700 text-white rounded"
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "

                a
                    href=(endpoints::LOG_IN_VIEW) tabindex="0"
                    class="font-semibold leading-6 text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form(&RegisterForm::default(), None, None);
    let content = log_in_register("Create Account", &registration_form);
    base("Register", &content).into_response()
}

/// The state needed for creating a new account.
#[derive(Clone)]
pub struct RegistrationState {
    /// The client for the backend auth service.
    pub api: Arc<dyn FinanceApi>,
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Default, Serialize, Deserialize)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Handler for registration requests via the POST method.
///
/// Creates the account with the auth service, then logs in with the same
/// credentials so the new user lands on the dashboard with a session already
/// established.
pub async fn post_register(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    if user_data.password != user_data.confirm_password {
        return registration_form(&user_data, None, Some("Passwords do not match"))
            .into_response();
    }

    let new_user = NewUser {
        email: user_data.email.clone(),
        password: user_data.password.clone(),
        first_name: user_data.first_name.clone(),
        last_name: user_data.last_name.clone(),
    };

    match state.api.register(&new_user).await {
        Ok(_) => {}
        Err(ApiError::Rejected(message)) => {
            return registration_form(&user_data, Some(&message), None).into_response();
        }
        Err(error) => {
            tracing::error!("Error registering against the auth service: {error}");
            return get_internal_server_error_redirect();
        }
    }

    let credentials = Credentials {
        email: user_data.email.clone(),
        password: user_data.password.clone(),
    };

    let log_in_response = match state.api.log_in(&credentials).await {
        Ok(log_in_response) => log_in_response,
        Err(error) => {
            tracing::error!("Error logging in a freshly registered account: {error}");
            return get_internal_server_error_redirect();
        }
    };

    match set_auth_cookie(jar, &log_in_response.token, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An error occurred while setting the auth cookie: {error}");

            get_internal_server_error_redirect()
        }
    }
}

#[cfg(test)]
mod get_register_page_tests {
    use axum::http::{StatusCode, header::CONTENT_TYPE};

    use crate::{
        endpoints,
        test_utils::{assert_valid_html, parse_html_document},
    };

    use super::get_register_page;

    #[tokio::test]
    async fn render_register_page() {
        let response = get_register_page().await;
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
            Some(endpoints::REGISTER_API),
            "want form with attribute hx-post=\"{}\", got {:?}",
            endpoints::REGISTER_API,
            hx_post
        );

        struct FormInput {
            type_: &'static str,
            id: &'static str,
        }

        let want_form_inputs: Vec<FormInput> = vec![
            FormInput {
                type_: "text",
                id: "first-name",
            },
            FormInput {
                type_: "text",
                id: "last-name",
            },
            FormInput {
                type_: "email",
                id: "email",
            },
            FormInput {
                type_: "password",
                id: "password",
            },
            FormInput {
                type_: "password",
                id: "confirm-password",
            },
        ];

        for FormInput { type_, id } in want_form_inputs {
            let selector_string = format!("input[type={type_}]#{id}");
            let input_selector = scraper::Selector::parse(&selector_string).unwrap();
            let inputs = form.select(&input_selector).collect::<Vec<_>>();
            assert_eq!(inputs.len(), 1, "want 1 {type_} input, got {}", inputs.len());
        }

        let log_in_link_selector = scraper::Selector::parse("a[href]").unwrap();
        let links = form.select(&log_in_link_selector).collect::<Vec<_>>();
        assert_eq!(links.len(), 1, "want 1 link, got {}", links.len());
        let link = links.first().unwrap();
        assert_eq!(
            link.value().attr("href"),
            Some(endpoints::LOG_IN_VIEW),
            "want link to {}, got {:?}",
            endpoints::LOG_IN_VIEW,
            link.value().attr("href")
        );
    }
}
