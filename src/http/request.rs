//! Request identification.
//!
//! # Responsibilities
//! - Name the correlation header
//! - Read the request id back out of a request
//!
//! # Design Decisions
//! - Ids are generated by `SetRequestIdLayer` (UUID v4) as early as possible
//! - A client-supplied `x-request-id` is kept, not overwritten

use axum::http::{HeaderMap, HeaderName};

pub const X_REQUEST_ID: &str = "x-request-id";

pub fn request_id_header() -> HeaderName {
    HeaderName::from_static(X_REQUEST_ID)
}

/// Access to the request id on anything carrying headers.
pub trait RequestIdExt {
    /// The request id, or `"unknown"` outside the request-id layer.
    fn request_id(&self) -> &str;
}

impl RequestIdExt for HeaderMap {
    fn request_id(&self) -> &str {
        self.get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}
