//! Portal edge gateway library.
//!
//! Locale and role aware request routing in front of a multi-role
//! education-center portal, plus the session token store behind its
//! login API.

pub mod admin;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod session;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use routing::EdgeRouter;
