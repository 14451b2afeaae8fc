//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    middleware::Next,
    response::Response,
};

/// The number of characters of a body shown in the `info` level logs.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body = read_body(body).await;
    log_body(&format!("Received request: {parts:#?}"), "request", &body);

    let request = Request::from_parts(parts, Body::from(body));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body = read_body(body).await;
    log_body(&format!("Sending response: {parts:#?}"), "response", &body);

    Response::from_parts(parts, Body::from(body))
}

async fn read_body(body: Body) -> Bytes {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .inspect_err(|error| tracing::warn!("could not read body for logging: {error}"))
        .unwrap_or_default()
}

fn log_body(summary: &str, kind: &str, body: &[u8]) {
    let text = String::from_utf8_lossy(body);

    match truncate(&text) {
        Some(truncated) => {
            tracing::info!("{summary}\nbody: {truncated}...");
            tracing::debug!("Full {kind} body: {text:?}");
        }
        None => tracing::info!("{summary}\nbody: {text:?}"),
    }
}

/// The first [LOG_BODY_LENGTH_LIMIT] characters of `text`, or `None` if it is short enough.
fn truncate(text: &str) -> Option<&str> {
    let (cut, _) = text.char_indices().nth(LOG_BODY_LENGTH_LIMIT)?;
    Some(&text[..cut])
}

#[cfg(test)]
mod tests {
    use super::{LOG_BODY_LENGTH_LIMIT, truncate};

    #[test]
    fn short_bodies_are_not_truncated() {
        let text = "a".repeat(LOG_BODY_LENGTH_LIMIT);

        assert_eq!(truncate(&text), None);
    }

    #[test]
    fn long_bodies_are_cut_at_the_limit() {
        let text = "a".repeat(LOG_BODY_LENGTH_LIMIT + 10);

        assert_eq!(truncate(&text).map(str::len), Some(LOG_BODY_LENGTH_LIMIT));
    }

    #[test]
    fn truncation_respects_character_boundaries() {
        let text = "é".repeat(LOG_BODY_LENGTH_LIMIT + 1);

        let truncated = truncate(&text).unwrap();

        assert_eq!(truncated.chars().count(), LOG_BODY_LENGTH_LIMIT);
    }
}
