//! Edge routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, query, cookies)
//!     → matcher.rs (is the path in the router's scope?)
//!     → router.rs (locale detection, area classification, auth)
//!     → access.rs (role → allowed prefixes)
//!     → Decision: pass through | redirect, plus cookies to set
//!
//! Router Construction (at startup / on reload):
//!     GatewayConfig
//!     → locales, portal paths, access map, dev bypass flags
//!     → Freeze as immutable EdgeRouter
//! ```
//!
//! # Design Decisions
//! - Router is immutable; reloads swap a whole new instance
//! - Closed sets (locales, roles) are enums, not strings
//! - Prefix checks respect path segment boundaries
//! - Deterministic: same request and cookies, same decision

pub mod access;
pub mod cookies;
pub mod decision;
pub mod locale;
pub mod matcher;
pub mod role;
pub mod router;

pub use access::{AccessMap, RoleArea};
pub use decision::{Decision, DecisionKind, Outcome};
pub use locale::Locale;
pub use role::Role;
pub use router::{EdgeRouter, RouteRequest};
