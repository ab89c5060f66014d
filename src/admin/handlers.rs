use axum::{extract::State, Json};
use serde::Serialize;

use crate::admin::AdminState;
use crate::config::Deployment;
use crate::routing::{AccessMap, Role};
use crate::session::SessionSummary;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub deployment: Deployment,
    pub uptime_secs: u64,
    /// Role assumed by the development bypass; null when the bypass is off.
    pub dev_bypass: Option<Role>,
    pub upstream: String,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let runtime = state.runtime.load();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        deployment: state.deployment,
        uptime_secs: state.started_at.elapsed().as_secs(),
        dev_bypass: runtime.router.dev_bypass().map(|b| b.default_role),
        upstream: runtime.upstream.to_string(),
    })
}

pub async fn get_sessions(State(state): State<AdminState>) -> Json<SessionSummary> {
    Json(state.sessions.summary().await)
}

pub async fn get_access(State(state): State<AdminState>) -> Json<AccessMap> {
    Json(state.runtime.load().router.access().clone())
}
