//! Response construction.
//!
//! # Responsibilities
//! - Build router redirects (307, `Location`, `Set-Cookie`)
//! - Attach router cookies to forwarded responses
//! - Render JSON error bodies
//!
//! # Design Decisions
//! - Temporary redirects keep the request method
//! - Cookies are appended, never replacing upstream `Set-Cookie` headers

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::routing::cookies::SetCookie;

/// Append `Set-Cookie` headers for the given cookies.
pub fn append_cookies(response: &mut Response, cookies: &[SetCookie]) {
    let headers = response.headers_mut();
    for cookie in cookies {
        match HeaderValue::from_str(&cookie.header_value()) {
            Ok(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(cookie = cookie.name, error = %e, "Dropping unrepresentable cookie"),
        }
    }
}

/// 307 redirect to `location`, carrying `cookies`.
pub fn redirect(location: &str, cookies: &[SetCookie]) -> Response {
    let mut response = match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::warn!(location = %location, "Redirect target is not a valid header value");
            return json_error(StatusCode::BAD_REQUEST, "Invalid redirect target");
        }
    };
    append_cookies(&mut response, cookies);
    response
}

/// `{"error": message}` with the given status.
pub fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{Locale, Role};

    #[test]
    fn test_redirect_carries_cookies() {
        let response = redirect(
            "/en/403",
            &[SetCookie::role(Role::Student), SetCookie::locale(Locale::En)],
        );
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/en/403");

        let cookies: Vec<_> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("role=STUDENT;"));
        assert!(cookies[1].starts_with("locale=en;"));
    }

    #[test]
    fn test_append_keeps_existing_cookies() {
        let mut response = (
            StatusCode::OK,
            [(header::SET_COOKIE, "upstream=1; Path=/")],
        )
            .into_response();
        append_cookies(&mut response, &[SetCookie::locale(Locale::Vi)]);
        assert_eq!(response.headers().get_all(header::SET_COOKIE).iter().count(), 2);
    }
}
