//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::{AccessMap, Locale, Role};
use crate::session::users::UserRecord;

/// Root configuration for the portal edge gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Where this instance runs. Development shortcuts never apply in production.
    pub deployment: Deployment,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The web application requests are forwarded to.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Supported site languages.
    pub locales: LocaleConfig,

    /// Portal page locations.
    pub portal: PortalConfig,

    /// Role → allowed path prefixes.
    pub access: AccessMap,

    /// Development auto-login.
    pub dev_bypass: DevBypassConfig,

    /// Token lifetimes and sweeping.
    pub sessions: SessionConfig,

    /// Login/refresh/logout endpoints served by the gateway.
    pub auth_api: AuthApiConfig,

    /// Accounts known to the in-memory user directory.
    pub users: Vec<UserRecord>,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,
}

/// Deployment kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Deployment {
    #[default]
    Development,
    Preview,
    Production,
}

impl std::str::FromStr for Deployment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Deployment::Development),
            "preview" => Ok(Deployment::Preview),
            "production" | "prod" => Ok(Deployment::Production),
            other => Err(format!("unknown deployment: {other}")),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream web application.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// `host:port` of the web application.
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Locales recognised as a leading path segment or cookie value.
    pub supported: Vec<Locale>,

    /// Used when neither the path nor the cookie names a locale.
    pub default: Locale,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            supported: Locale::ALL.to_vec(),
            default: Locale::Vi,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Prefix of the role-gated area.
    pub root: String,

    /// Login page, relative to the locale prefix.
    pub login_path: String,

    /// Access-denied page, relative to the locale prefix.
    pub forbidden_path: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            root: "/portal".to_string(),
            login_path: "/auth/login".to_string(),
            forbidden_path: "/403".to_string(),
        }
    }
}

/// Development auto-login. Distinct switches for local development and
/// preview deployments; both are ignored in production.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DevBypassConfig {
    pub local_auto_login: bool,
    pub preview_auto_login: bool,

    /// Role written when the login URL carries no `role` parameter.
    pub default_role: Role,
}

impl Default for DevBypassConfig {
    fn default() -> Self {
        Self {
            local_auto_login: false,
            preview_auto_login: false,
            default_role: Role::Admin,
        }
    }
}

impl DevBypassConfig {
    pub fn is_active(&self, deployment: Deployment) -> bool {
        match deployment {
            Deployment::Development => self.local_auto_login,
            Deployment::Preview => self.preview_auto_login,
            Deployment::Production => false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Access token lifetime in seconds.
    pub access_ttl_secs: u64,

    /// Refresh token lifetime in seconds.
    pub refresh_ttl_secs: u64,

    /// How often expired tokens are purged, in seconds. 0 disables sweeping.
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            access_ttl_secs: 60 * 60,
            refresh_ttl_secs: 30 * 24 * 60 * 60,
            sweep_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthApiConfig {
    pub enabled: bool,

    /// Mount point of the auth endpoints.
    pub prefix: String,
}

impl Default for AuthApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prefix: "/api/auth".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub log_filter: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "portal_edge=debug,tower_http=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

pub const PLACEHOLDER_ADMIN_KEY: &str = "CHANGE_ME_IN_PRODUCTION";

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: PLACEHOLDER_ADMIN_KEY.to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
