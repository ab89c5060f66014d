//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::{Deployment, GatewayConfig};
use crate::config::validation::{validate_config, ValidationError};
use crate::routing::Role;

pub const ENV_DEPLOYMENT: &str = "PORTAL_DEPLOYMENT";
pub const ENV_DEV_AUTO_LOGIN: &str = "PORTAL_DEV_AUTO_LOGIN";
pub const ENV_PREVIEW_AUTO_LOGIN: &str = "PORTAL_PREVIEW_AUTO_LOGIN";
pub const ENV_DEV_DEFAULT_ROLE: &str = "PORTAL_DEV_DEFAULT_ROLE";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value {value:?} for {var}")]
    Env { var: &'static str, value: String },

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Env {
            var,
            value: value.to_string(),
        }),
    }
}

/// Apply environment overrides using `lookup` to read variables.
///
/// Runs once at startup; the router never reads the environment itself.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_DEPLOYMENT) {
        config.deployment = value.parse::<Deployment>().map_err(|_| ConfigError::Env {
            var: ENV_DEPLOYMENT,
            value,
        })?;
    }
    if let Some(value) = lookup(ENV_DEV_AUTO_LOGIN) {
        config.dev_bypass.local_auto_login = parse_flag(ENV_DEV_AUTO_LOGIN, &value)?;
    }
    if let Some(value) = lookup(ENV_PREVIEW_AUTO_LOGIN) {
        config.dev_bypass.preview_auto_login = parse_flag(ENV_PREVIEW_AUTO_LOGIN, &value)?;
    }
    if let Some(value) = lookup(ENV_DEV_DEFAULT_ROLE) {
        config.dev_bypass.default_role = value.trim().parse::<Role>().map_err(|_| ConfigError::Env {
            var: ENV_DEV_DEFAULT_ROLE,
            value,
        })?;
    }
    Ok(())
}

/// Parse and validate a TOML document. No environment overrides.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load a TOML file, apply process environment overrides, and validate.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: GatewayConfig = toml::from_str(&content)?;
    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Defaults plus process environment overrides, validated.
pub fn load_defaults() -> Result<GatewayConfig, ConfigError> {
    let mut config = GatewayConfig::default();
    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
