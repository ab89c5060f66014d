//! Edge request router.
//!
//! # Responsibilities
//! - Detect the request locale (path segment, cookie, default)
//! - Classify the path (public, portal root, gated area)
//! - Apply the development login bypass and role sync when enabled
//! - Authorize the role cookie against the access map
//! - Keep the locale cookie in sync with the path segment
//!
//! # Design Decisions
//! - Pure function of the request and the immutable settings; no I/O
//! - Every branch is a terminal decision, never an error
//! - Built once per config generation and shared via `ArcSwap`

use axum::http::{HeaderMap, Uri};
use url::form_urlencoded;

use crate::config::GatewayConfig;
use crate::routing::access::AccessMap;
use crate::routing::cookies::{CookieJar, SetCookie, LOCALE_COOKIE, ROLE_COOKIE};
use crate::routing::decision::{Decision, DecisionKind};
use crate::routing::matcher::{
    has_segment_prefix, is_exact_path, AnyMatcher, ExactPathMatcher, Matcher, PathPrefixMatcher,
};
use crate::routing::{Locale, Role};

/// The inputs the router looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteRequest {
    pub path: String,
    pub query: Option<String>,
    pub cookies: CookieJar,
}

impl RouteRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name, value);
        self
    }

    pub fn from_http(uri: &Uri, headers: &HeaderMap) -> Self {
        Self {
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            cookies: CookieJar::from_headers(headers),
        }
    }

    /// Original path plus `?query` when one was sent.
    pub fn path_and_query(&self) -> String {
        match self.query.as_deref() {
            Some(q) if !q.is_empty() => format!("{}?{}", self.path, q),
            _ => self.path.clone(),
        }
    }

    fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    }
}

/// Settings for the development auto-login path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevBypass {
    pub default_role: Role,
}

/// Locale- and role-aware request router.
#[derive(Debug)]
pub struct EdgeRouter {
    supported: Vec<Locale>,
    default_locale: Locale,
    portal_root: String,
    login_path: String,
    forbidden_path: String,
    access: AccessMap,
    dev_bypass: Option<DevBypass>,
    scope: AnyMatcher,
}

impl EdgeRouter {
    /// Build the router from a validated configuration.
    pub fn from_config(config: &GatewayConfig) -> Self {
        let dev_bypass = config
            .dev_bypass
            .is_active(config.deployment)
            .then_some(DevBypass {
                default_role: config.dev_bypass.default_role,
            });

        let mut router = Self {
            supported: config.locales.supported.clone(),
            default_locale: config.locales.default,
            portal_root: config.portal.root.clone(),
            login_path: config.portal.login_path.clone(),
            forbidden_path: config.portal.forbidden_path.clone(),
            access: config.access.clone(),
            dev_bypass,
            scope: AnyMatcher::default(),
        };
        router.scope = router.build_scope();
        router
    }

    /// Paths the middleware evaluates; everything else bypasses the router.
    fn build_scope(&self) -> AnyMatcher {
        let mut scope = AnyMatcher::default();
        scope.push(ExactPathMatcher::new("/"));
        for locale in &self.supported {
            scope.push(PathPrefixMatcher::new(format!("/{}", locale.code())));
        }
        scope.push(ExactPathMatcher::new(self.login_path.clone()));
        scope.push(PathPrefixMatcher::new(self.portal_root.clone()));
        for legacy in self.access.legacy_prefixes() {
            scope.push(PathPrefixMatcher::new(legacy));
        }
        scope
    }

    pub fn in_scope(&self, path: &str) -> bool {
        self.scope.matches(path)
    }

    pub fn access(&self) -> &AccessMap {
        &self.access
    }

    pub fn dev_bypass(&self) -> Option<DevBypass> {
        self.dev_bypass
    }

    fn supported_locale(&self, code: &str) -> Option<Locale> {
        code.parse::<Locale>()
            .ok()
            .filter(|l| self.supported.contains(l))
    }

    /// Split a leading locale segment off the path.
    /// `/vi` and `/vi/` both strip to `/`.
    fn split_locale<'a>(&self, path: &'a str) -> (Option<Locale>, &'a str) {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let (first, rest) = match trimmed.find('/') {
            Some(i) => (&trimmed[..i], &trimmed[i..]),
            None => (trimmed, ""),
        };
        match self.supported_locale(first) {
            Some(locale) if rest.is_empty() => (Some(locale), "/"),
            Some(locale) => (Some(locale), rest),
            None => (None, path),
        }
    }

    fn is_gated(&self, path: &str) -> bool {
        has_segment_prefix(path, &self.portal_root)
            || self
                .access
                .legacy_prefixes()
                .any(|legacy| has_segment_prefix(path, legacy))
    }

    fn localized(segment: Option<Locale>, path: &str) -> String {
        match segment {
            Some(locale) => format!("/{}{}", locale.code(), path),
            None => path.to_string(),
        }
    }

    /// Route one request.
    pub fn route(&self, req: &RouteRequest) -> Decision {
        let (segment, stripped) = self.split_locale(&req.path);
        let locale = segment
            .or_else(|| {
                req.cookies
                    .get(LOCALE_COOKIE)
                    .and_then(|code| self.supported_locale(code))
            })
            .unwrap_or(self.default_locale);
        let role = req
            .cookies
            .get(ROLE_COOKIE)
            .and_then(|value| value.parse::<Role>().ok());

        let decision = self.decide(req, segment, stripped, locale, role);
        match segment {
            Some(seg) => decision.with_cookie(SetCookie::locale(seg)),
            None => decision,
        }
    }

    fn decide(
        &self,
        req: &RouteRequest,
        segment: Option<Locale>,
        stripped: &str,
        locale: Locale,
        role: Option<Role>,
    ) -> Decision {
        if let Some(bypass) = self.dev_bypass {
            if is_exact_path(stripped, &self.login_path) {
                let bypass_role = req
                    .query_param("role")
                    .and_then(|r| r.parse::<Role>().ok())
                    .unwrap_or(bypass.default_role);
                let target = req
                    .query_param("returnTo")
                    .filter(|t| is_local_target(t))
                    .unwrap_or_else(|| Self::localized(segment, &self.portal_root));
                return Decision::redirect(DecisionKind::DevLoginBypass, target, locale, Some(bypass_role))
                    .with_cookie(SetCookie::role(bypass_role));
            }
        }

        if !self.is_gated(stripped) {
            return Decision::pass(DecisionKind::PublicArea, locale, role);
        }

        if is_exact_path(stripped, &self.portal_root) {
            return Decision::pass(DecisionKind::PortalRoot, locale, role);
        }

        if self.dev_bypass.is_some() {
            if let Some(inferred) = self.access.infer_role(stripped) {
                if role != Some(inferred) {
                    return Decision::redirect(
                        DecisionKind::DevRoleSync,
                        req.path_and_query(),
                        locale,
                        Some(inferred),
                    )
                    .with_cookie(SetCookie::role(inferred));
                }
            }
        }

        let Some(role) = role else {
            let return_to: String =
                form_urlencoded::byte_serialize(req.path_and_query().as_bytes()).collect();
            let location = format!("/{}{}?returnTo={}", locale.code(), self.login_path, return_to);
            return Decision::redirect(DecisionKind::Unauthenticated, location, locale, None);
        };

        if self.access.permits(role, stripped) {
            Decision::pass(DecisionKind::Authorized, locale, Some(role))
        } else {
            let location = format!("/{}{}", locale.code(), self.forbidden_path);
            Decision::redirect(DecisionKind::Forbidden, location, locale, Some(role))
        }
    }
}

/// Only same-origin absolute paths are accepted as redirect targets.
fn is_local_target(target: &str) -> bool {
    target.starts_with('/') && !target.starts_with("//") && !target.starts_with("/\\")
}
