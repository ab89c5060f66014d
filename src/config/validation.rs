//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (dev default role has an access entry)
//! - Validate value ranges (timeouts and TTLs > 0, addresses parse)
//! - Validate path shapes used for prefix matching
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::uri::Authority;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::config::schema::{Deployment, GatewayConfig, PLACEHOLDER_ADMIN_KEY};
use crate::routing::{Locale, Role};

/// Upper bound for token lifetimes: ten years.
pub const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("locales.supported must not be empty")]
    NoLocales,

    #[error("locales.default ({0}) is not in locales.supported")]
    DefaultLocaleUnsupported(Locale),

    #[error("{field}: {value:?} must start with '/' and contain no '?', '#' or whitespace")]
    InvalidPath { field: String, value: String },

    #[error("{field}: {value:?} is not a valid address")]
    InvalidAddress { field: String, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{field} ({value}s) exceeds the {max}s limit")]
    TtlTooLarge {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("dev_bypass.default_role {0} has no access entry")]
    DefaultRoleUnmapped(Role),

    #[error("legacy prefix {0:?} overlaps the portal root")]
    LegacyUnderPortal(String),

    #[error("duplicate user identifier {0:?}")]
    DuplicateUser(String),

    #[error("admin.api_key must be changed before enabling the admin API in production")]
    PlaceholderAdminKey,
}

fn check_path(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    let bad = !value.starts_with('/')
        || value.contains(['?', '#'])
        || value.chars().any(char::is_whitespace);
    if bad {
        errors.push(ValidationError::InvalidPath {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.locales.supported.is_empty() {
        errors.push(ValidationError::NoLocales);
    } else if !config.locales.supported.contains(&config.locales.default) {
        errors.push(ValidationError::DefaultLocaleUnsupported(config.locales.default));
    }

    check_path(&mut errors, "portal.root", &config.portal.root);
    check_path(&mut errors, "portal.login_path", &config.portal.login_path);
    check_path(&mut errors, "portal.forbidden_path", &config.portal.forbidden_path);
    if config.portal.root == "/" {
        errors.push(ValidationError::InvalidPath {
            field: "portal.root".to_string(),
            value: config.portal.root.clone(),
        });
    }

    for (role, area) in config.access.iter() {
        check_path(&mut errors, &format!("access.{role}.home"), &area.home);
        for prefix in &area.allow {
            check_path(&mut errors, &format!("access.{role}.allow"), prefix);
        }
        for legacy in &area.legacy {
            check_path(&mut errors, &format!("access.{role}.legacy"), legacy);
            if crate::routing::matcher::has_segment_prefix(legacy, &config.portal.root) {
                errors.push(ValidationError::LegacyUnderPortal(legacy.clone()));
            }
        }
    }

    // A bypass role without an entry would loop between login and 403.
    if config.access.area(config.dev_bypass.default_role).is_none() {
        errors.push(ValidationError::DefaultRoleUnmapped(config.dev_bypass.default_role));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address".to_string(),
            value: config.listener.bind_address.clone(),
        });
    }
    if Authority::from_str(&config.upstream.address).is_err() || config.upstream.address.contains('@') {
        errors.push(ValidationError::InvalidAddress {
            field: "upstream.address".to_string(),
            value: config.upstream.address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }
    if config.sessions.access_ttl_secs == 0 {
        errors.push(ValidationError::Zero("sessions.access_ttl_secs"));
    }
    if config.sessions.refresh_ttl_secs == 0 {
        errors.push(ValidationError::Zero("sessions.refresh_ttl_secs"));
    }
    for (field, value) in [
        ("sessions.access_ttl_secs", config.sessions.access_ttl_secs),
        ("sessions.refresh_ttl_secs", config.sessions.refresh_ttl_secs),
    ] {
        if value > MAX_TTL_SECS {
            errors.push(ValidationError::TtlTooLarge {
                field,
                value,
                max: MAX_TTL_SECS,
            });
        }
    }

    if config.auth_api.enabled {
        check_path(&mut errors, "auth_api.prefix", &config.auth_api.prefix);
        if config.auth_api.prefix == "/" || config.auth_api.prefix.ends_with('/') {
            errors.push(ValidationError::InvalidPath {
                field: "auth_api.prefix".to_string(),
                value: config.auth_api.prefix.clone(),
            });
        }
    }

    let mut ids = HashSet::new();
    let mut identifiers = HashSet::new();
    for user in &config.users {
        if !ids.insert(user.id.as_str()) {
            errors.push(ValidationError::DuplicateUser(user.id.clone()));
        }
        let own: HashSet<String> = [user.email.to_lowercase(), user.username.to_lowercase()]
            .into_iter()
            .collect();
        for key in own {
            if !identifiers.insert(key.clone()) {
                errors.push(ValidationError::DuplicateUser(key));
            }
        }
    }

    if config.admin.enabled {
        if config.admin.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                field: "admin.bind_address".to_string(),
                value: config.admin.bind_address.clone(),
            });
        }
        if config.deployment == Deployment::Production && config.admin.api_key == PLACEHOLDER_ADMIN_KEY {
            errors.push(ValidationError::PlaceholderAdminKey);
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address".to_string(),
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
