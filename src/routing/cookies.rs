//! Cookie parsing and `Set-Cookie` rendering for the portal cookies.

use axum::http::{header::COOKIE, HeaderMap};
use serde::Serialize;

use crate::routing::{Locale, Role};

pub const LOCALE_COOKIE: &str = "locale";
pub const ROLE_COOKIE: &str = "role";

/// One year, in seconds.
pub const COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 365;

/// Request cookies, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    pairs: Vec<(String, String)>,
}

impl CookieJar {
    /// Collect cookies from every `Cookie` header on the request.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut jar = Self::default();
        for value in headers.get_all(COOKIE) {
            if let Ok(raw) = value.to_str() {
                jar.extend_from_str(raw);
            }
        }
        jar
    }

    /// Parse a single `Cookie` header value (`a=1; b=2`).
    pub fn parse(raw: &str) -> Self {
        let mut jar = Self::default();
        jar.extend_from_str(raw);
        jar
    }

    fn extend_from_str(&mut self, raw: &str) {
        for cookie in raw.split(';') {
            let mut parts = cookie.trim().splitn(2, '=');
            if let (Some(name), Some(value)) = (parts.next(), parts.next()) {
                if !name.is_empty() {
                    self.pairs.push((name.to_string(), value.trim_matches('"').to_string()));
                }
            }
        }
    }

    /// First value for `name`. Empty values count as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.pairs.retain(|(n, _)| *n != name);
        self.pairs.push((name, value.into()));
    }
}

/// A cookie the gateway wants the browser to store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetCookie {
    pub name: &'static str,
    pub value: String,
    pub max_age_secs: u64,
    pub http_only: bool,
}

impl SetCookie {
    pub fn locale(locale: Locale) -> Self {
        Self {
            name: LOCALE_COOKIE,
            value: locale.code().to_string(),
            max_age_secs: COOKIE_MAX_AGE_SECS,
            http_only: false,
        }
    }

    /// The role cookie is read by client-side code, so it is never HttpOnly.
    pub fn role(role: Role) -> Self {
        Self {
            name: ROLE_COOKIE,
            value: role.as_str().to_string(),
            max_age_secs: COOKIE_MAX_AGE_SECS,
            http_only: false,
        }
    }

    pub fn clear_role() -> Self {
        Self {
            name: ROLE_COOKIE,
            value: String::new(),
            max_age_secs: 0,
            http_only: false,
        }
    }

    /// Render as a `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        let mut out = format!(
            "{}={}; Path=/; Max-Age={}; SameSite=Lax",
            self.name, self.value, self.max_age_secs
        );
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_parse_multiple_cookies() {
        let jar = CookieJar::parse("theme=dark; role=ADMIN;locale=en");
        assert_eq!(jar.get("role"), Some("ADMIN"));
        assert_eq!(jar.get("locale"), Some("en"));
        assert_eq!(jar.get("theme"), Some("dark"));
        assert_eq!(jar.get("missing"), None);
    }

    #[test]
    fn test_empty_value_is_absent() {
        let jar = CookieJar::parse("role=; locale=vi");
        assert_eq!(jar.get("role"), None);
        assert_eq!(jar.get("locale"), Some("vi"));
    }

    #[test]
    fn test_first_occurrence_wins_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("role=TEACHER"));
        headers.append(COOKIE, HeaderValue::from_static("role=ADMIN; locale=en"));
        let jar = CookieJar::from_headers(&headers);
        assert_eq!(jar.get("role"), Some("TEACHER"));
        assert_eq!(jar.get("locale"), Some("en"));
    }

    #[test]
    fn test_set_cookie_rendering() {
        assert_eq!(
            SetCookie::locale(Locale::En).header_value(),
            "locale=en; Path=/; Max-Age=31536000; SameSite=Lax"
        );
        assert_eq!(
            SetCookie::role(Role::Teacher).header_value(),
            "role=TEACHER; Path=/; Max-Age=31536000; SameSite=Lax"
        );
        assert_eq!(
            SetCookie::clear_role().header_value(),
            "role=; Path=/; Max-Age=0; SameSite=Lax"
        );
    }
}
