//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, tracing, timeout)
//!     → middleware/edge.rs (EdgeRouter decision: redirect or continue)
//!     → auth.rs (session API, served locally)
//!       or server.rs forward_handler (upstream web application)
//!     → response.rs (redirects, cookies, error bodies)
//!     → Send to client
//! ```

pub mod auth;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{build_router, AppState, GatewayRuntime, GatewayServer};
