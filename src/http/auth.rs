//! Session API: login, refresh, current user, logout.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::http::response::{append_cookies, json_error};
use crate::http::server::AppState;
use crate::routing::cookies::SetCookie;
use crate::session::{SessionError, SessionState, TokenBundle, UserDirectory, UserProfile};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "email", alias = "username")]
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenBundle,
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Unknown user")]
    UnknownUser,
    #[error("Session store unavailable")]
    Unavailable,
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidToken => AuthError::InvalidToken,
            SessionError::ExpiryOverflow => AuthError::Unavailable,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        };
        json_error(status, &self.to_string())
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)
}

async fn login(
    State(users): State<Arc<UserDirectory>>,
    State(sessions): State<SessionState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    let user = users
        .authenticate(&body.identifier, &body.password)
        .ok_or_else(|| {
            tracing::info!("Rejected login attempt");
            AuthError::InvalidCredentials
        })?;

    let tokens = sessions.issue(&user.id).await?;
    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    let role = user.role;
    let mut response = Json(LoginResponse { tokens, user }).into_response();
    append_cookies(&mut response, &[SetCookie::role(role)]);
    Ok(response)
}

async fn refresh(
    State(sessions): State<SessionState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenBundle>, AuthError> {
    let tokens = sessions.rotate(&body.refresh_token).await?;
    Ok(Json(tokens))
}

async fn me(
    State(users): State<Arc<UserDirectory>>,
    State(sessions): State<SessionState>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, AuthError> {
    let token = bearer_token(&headers)?;
    let user_id = sessions.resolve(token).await.ok_or(AuthError::InvalidToken)?;
    users.find(&user_id).map(Json).ok_or(AuthError::UnknownUser)
}

async fn logout(State(sessions): State<SessionState>, headers: HeaderMap) -> Result<Response, AuthError> {
    let token = bearer_token(&headers)?;
    let user_id = sessions.resolve(token).await.ok_or(AuthError::InvalidToken)?;
    let revoked = sessions.revoke_all(&user_id).await;
    tracing::info!(user_id = %user_id, revoked, "User logged out");

    let mut response = StatusCode::NO_CONTENT.into_response();
    append_cookies(&mut response, &[SetCookie::clear_role()]);
    Ok(response)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/me", get(me))
        .route("/logout", post(logout))
}
