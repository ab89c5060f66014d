//! Admin API served on its own listener.
//!
//! Every route requires `Authorization: Bearer <admin.api_key>`.

pub mod auth;
pub mod handlers;

use arc_swap::ArcSwap;
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use std::time::Instant;

use crate::config::{Deployment, GatewayConfig};
use crate::http::server::{AppState, GatewayRuntime};
use crate::session::SessionState;

use self::auth::admin_auth_middleware;
use self::handlers::{get_access, get_sessions, get_status};

#[derive(Clone)]
pub struct AdminState {
    pub api_key: Arc<str>,
    pub deployment: Deployment,
    pub runtime: Arc<ArcSwap<GatewayRuntime>>,
    pub sessions: SessionState,
    pub started_at: Instant,
}

impl AdminState {
    pub fn new(config: &GatewayConfig, app: &AppState) -> Self {
        Self {
            api_key: Arc::from(config.admin.api_key.as_str()),
            deployment: config.deployment,
            runtime: app.runtime.clone(),
            sessions: app.sessions.clone(),
            started_at: Instant::now(),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/sessions", get(get_sessions))
        .route("/admin/access", get(get_access))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
