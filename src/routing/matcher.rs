//! Path matching primitives.
//!
//! # Responsibilities
//! - Match path prefixes on segment boundaries
//! - Match exact paths, tolerating one trailing slash
//! - Combine matchers with OR semantics (middleware scope)
//!
//! # Design Decisions
//! - Matching is case-sensitive
//! - `/portal/admin` matches `/portal/admin` and `/portal/admin/x`,
//!   never `/portal/admins`
//! - No regex in the hot path

/// Returns true if `path` equals `prefix` or continues it with a `/`.
pub fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return path.starts_with('/');
    }
    let prefix = prefix.trim_end_matches('/');
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Returns true if `path` is `target`, with or without a trailing slash.
pub fn is_exact_path(path: &str, target: &str) -> bool {
    if path == target {
        return true;
    }
    let target = target.trim_end_matches('/');
    path.strip_suffix('/').is_some_and(|p| p == target)
}

/// Trait for matching request paths against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches one path exactly (trailing slash tolerated).
#[derive(Debug, Clone)]
pub struct ExactPathMatcher {
    path: String,
}

impl ExactPathMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for ExactPathMatcher {
    fn matches(&self, path: &str) -> bool {
        is_exact_path(path, &self.path)
    }
}

/// Matches a path prefix on segment boundaries.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        has_segment_prefix(path, &self.prefix)
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug, Default)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    pub fn push(&mut self, matcher: impl Matcher + 'static) {
        self.matchers.push(Box::new(matcher));
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_prefix() {
        assert!(has_segment_prefix("/portal/admin", "/portal/admin"));
        assert!(has_segment_prefix("/portal/admin/fees", "/portal/admin"));
        assert!(has_segment_prefix("/portal/admin/", "/portal/admin"));
        assert!(!has_segment_prefix("/portal/admins", "/portal/admin"));
        assert!(!has_segment_prefix("/portal", "/portal/admin"));
        assert!(has_segment_prefix("/anything", "/"));
    }

    #[test]
    fn test_trailing_slash_in_prefix() {
        assert!(has_segment_prefix("/teacher/x", "/teacher/"));
        assert!(!has_segment_prefix("/teachers", "/teacher/"));
    }

    #[test]
    fn test_exact_path() {
        assert!(is_exact_path("/portal", "/portal"));
        assert!(is_exact_path("/portal/", "/portal"));
        assert!(!is_exact_path("/portal//", "/portal"));
        assert!(!is_exact_path("/portal/x", "/portal"));
        assert!(is_exact_path("/", "/"));
    }

    #[test]
    fn test_any_matcher() {
        let mut scope = AnyMatcher::default();
        assert!(!scope.matches("/"));

        scope.push(ExactPathMatcher::new("/"));
        scope.push(PathPrefixMatcher::new("/portal"));
        assert_eq!(scope.len(), 2);

        assert!(scope.matches("/"));
        assert!(scope.matches("/portal/teacher"));
        assert!(!scope.matches("/portals"));
        assert!(!scope.matches("/_next/static/app.js"));
    }
}
