//! The fallback route for URLs that do not match anything.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    let page = error_view(
        "Page Not Found",
        "404",
        "The page you are looking for does not exist.",
        "Check the URL or head back to the dashboard.",
    );

    (StatusCode::NOT_FOUND, Html(page.into_string())).into_response()
}

#[cfg(test)]
mod not_found_tests {
    use axum::http::StatusCode;
    use scraper::Selector;

    use crate::test_utils::{assert_valid_html, parse_html_document};

    use super::get_404_not_found;

    #[tokio::test]
    async fn unknown_route_renders_the_404_page() {
        let response = get_404_not_found().await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let heading_selector = Selector::parse("h1").unwrap();
        let heading = html
            .select(&heading_selector)
            .next()
            .expect("No heading found")
            .text()
            .collect::<String>();
        assert!(heading.contains("404"), "want 404 in heading, got {heading}");
    }
}
