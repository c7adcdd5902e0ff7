//! Middleware for logging requests and responses.

use axum::{extract::Request, http::header::CONTENT_TYPE, middleware::Next, response::Response};

/// How many bytes of a request or response body are logged at the `info`
/// level before the rest is pushed down to `debug`.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Password fields in form submissions are redacted before logging.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body_text) = split_request(request).await;

    if parts.method == axum::http::Method::POST
        && parts.headers.get(CONTENT_TYPE)
            == Some(&"application/x-www-form-urlencoded".parse().unwrap())
    {
        let display_text = redact_field(&body_text, "password");
        let display_text = redact_field(&display_text, "confirm_password");
        log_request(&parts, &display_text);
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body_text) = split_response(response).await;
    log_response(&parts, &body_text);

    Response::from_parts(parts, body_text.into())
}

fn redact_field(form_text: &str, field_name: &str) -> String {
    let start = match form_text.find(&format!("{field_name}=")) {
        Some(position) => position,
        None => return form_text.to_string(),
    };

    let end = match form_text[start..].find('&') {
        Some(end) => start + end,
        None => form_text.len(),
    };
    let field = &form_text[start..end];

    form_text.replace(field, &format!("{field_name}=********"))
}

async fn split_request(request: Request) -> (axum::http::request::Parts, String) {
    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();

    (parts, String::from_utf8_lossy(&body_bytes).to_string())
}

async fn split_response(response: Response) -> (axum::http::response::Parts, String) {
    let (parts, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();

    (parts, String::from_utf8_lossy(&body_bytes).to_string())
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {parts:#?}\nbody: {:}...",
            truncate_body(body)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {parts:#?}\nbody: {body:?}");
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {parts:#?}\nbody: {:}...",
            truncate_body(body)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {parts:#?}\nbody: {body:?}");
    }
}

/// Cut `body` down to at most [LOG_BODY_LENGTH_LIMIT] bytes without slicing
/// through a multi-byte character.
fn truncate_body(body: &str) -> &str {
    let mut end = LOG_BODY_LENGTH_LIMIT.min(body.len());
    while !body.is_char_boundary(end) {
        end -= 1;
    }

    &body[..end]
}
