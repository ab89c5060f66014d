//! Routing decisions produced by the edge router.

use serde::Serialize;

use crate::routing::cookies::SetCookie;
use crate::routing::{Locale, Role};

/// Which terminal branch of the router produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// Development login bypass wrote the role cookie.
    DevLoginBypass,
    /// Outside the gated area; never authorized.
    PublicArea,
    /// Portal root; the page picks the role's landing itself.
    PortalRoot,
    /// Development self-redirect correcting the role cookie.
    DevRoleSync,
    Unauthenticated,
    Forbidden,
    Authorized,
}

impl DecisionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionKind::DevLoginBypass => "dev_login_bypass",
            DecisionKind::PublicArea => "public_area",
            DecisionKind::PortalRoot => "portal_root",
            DecisionKind::DevRoleSync => "dev_role_sync",
            DecisionKind::Unauthenticated => "unauthenticated",
            DecisionKind::Forbidden => "forbidden",
            DecisionKind::Authorized => "authorized",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Outcome {
    PassThrough,
    Redirect { location: String },
}

/// Result of routing a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub kind: DecisionKind,
    pub outcome: Outcome,
    /// Effective locale of the request.
    pub locale: Locale,
    /// Role the caller presented, if valid.
    pub role: Option<Role>,
    /// Cookies to attach to whatever response is sent.
    pub cookies: Vec<SetCookie>,
}

impl Decision {
    pub(crate) fn pass(kind: DecisionKind, locale: Locale, role: Option<Role>) -> Self {
        Self {
            kind,
            outcome: Outcome::PassThrough,
            locale,
            role,
            cookies: Vec::new(),
        }
    }

    pub(crate) fn redirect(
        kind: DecisionKind,
        location: impl Into<String>,
        locale: Locale,
        role: Option<Role>,
    ) -> Self {
        Self {
            kind,
            outcome: Outcome::Redirect {
                location: location.into(),
            },
            locale,
            role,
            cookies: Vec::new(),
        }
    }

    pub(crate) fn with_cookie(mut self, cookie: SetCookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self.outcome, Outcome::PassThrough)
    }

    /// Redirect target, if this decision redirects.
    pub fn location(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Redirect { location } => Some(location),
            Outcome::PassThrough => None,
        }
    }

    /// The cookie with `name`, if the decision writes one.
    pub fn cookie(&self, name: &str) -> Option<&SetCookie> {
        self.cookies.iter().find(|c| c.name == name)
    }
}
