//! Middleware for logging requests and responses.

use axum::{extract::Request, http::header::CONTENT_TYPE, middleware::Next, response::Response};

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the response body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and logged at the `debug` level.
///
/// Password fields in JSON request bodies are redacted before logging.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (headers, body_text) = extract_header_and_body_text_from_request(request).await;

    let is_json = headers
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    if headers.method == axum::http::Method::POST && is_json {
        let display_text = redact_json_string_field(&body_text, "password");
        log_request(&headers, &display_text);
    } else {
        log_request(&headers, &body_text);
    }

    let request = Request::from_parts(headers, body_text.into());
    let response = next.run(request).await;

    let (headers, body_text) = extract_header_and_body_text_from_response(response).await;
    log_response(&headers, &body_text);

    Response::from_parts(headers, body_text.into())
}

/// Replace the string value of `field_name` in a JSON object with asterisks.
///
/// The replacement works on the raw text, so it only handles the common case
/// of a plain string value without escaped quotes.
fn redact_json_string_field(body_text: &str, field_name: &str) -> String {
    let key = format!("\"{field_name}\"");

    let key_start = match body_text.find(&key) {
        Some(position) => position,
        None => return body_text.to_string(),
    };

    let after_key = key_start + key.len();
    let colon = match body_text[after_key..].find(':') {
        Some(position) => after_key + position + 1,
        None => return body_text.to_string(),
    };

    let value_start = match body_text[colon..].find('"') {
        Some(position) => colon + position + 1,
        None => return body_text.to_string(),
    };

    let value_end = match body_text[value_start..].find('"') {
        Some(position) => value_start + position,
        None => return body_text.to_string(),
    };

    format!(
        "{}********{}",
        &body_text[..value_start],
        &body_text[value_end..]
    )
}

async fn extract_header_and_body_text_from_request(
    request: Request,
) -> (axum::http::request::Parts, String) {
    let (headers, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    (headers, String::from_utf8_lossy(&body_bytes).to_string())
}

async fn extract_header_and_body_text_from_response(
    response: Response,
) -> (axum::http::response::Parts, String) {
    let (headers, body) = response.into_parts();
    let body_bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    (headers, String::from_utf8_lossy(&body_bytes).to_string())
}

const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The first `limit` bytes of `text`, backed off to a character boundary so
/// the cut never lands inside a multibyte character.
fn truncate_to_char_boundary(text: &str, limit: usize) -> &str {
    let mut end = limit.min(text.len());

    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

fn log_request(headers: &axum::http::request::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Received request: {headers:#?}\nbody: {:}...",
            truncate_to_char_boundary(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full request body: {body:?}");
    } else {
        tracing::info!("Received request: {headers:#?}\nbody: {body:?}");
    }
}

fn log_response(headers: &axum::http::response::Parts, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "Sending response: {headers:#?}\nbody: {:}...",
            truncate_to_char_boundary(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full response body: {body:?}");
    } else {
        tracing::info!("Sending response: {headers:#?}\nbody: {body:?}");
    }
}
