//! Startup configuration loading.

use std::path::Path;

use crate::config::loader::{load_config, load_defaults};
use crate::config::{ConfigError, GatewayConfig};

/// Load the config file when one is given, otherwise the built-in
/// defaults. Environment overrides and validation apply either way.
pub fn load_startup_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let config = match path {
        Some(path) => load_config(path)?,
        None => load_defaults()?,
    };

    tracing::info!(
        source = %path.map(|p| p.display().to_string()).unwrap_or_else(|| "defaults".to_string()),
        deployment = ?config.deployment,
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        locales = config.locales.supported.len(),
        users = config.users.len(),
        "Configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = load_startup_config(None).unwrap();
        assert_eq!(config.portal.root, "/portal");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = load_startup_config(Some(Path::new("/nonexistent/portal-edge.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
