//! Request spans.

use axum::body::Body;
use axum::http::Request;
use tracing::Span;

use crate::http::request::RequestIdExt;

/// Span for `TraceLayer` carrying the request id, so every log line of a
/// request can be correlated.
pub fn http_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request.headers().request_id(),
    )
}
