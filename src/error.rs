//! Gateway-level errors.

use metrics_exporter_prometheus::BuildError;
use std::io;
use std::net::AddrParseError;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid upstream address {0:?}")]
    Upstream(String),

    #[error("invalid metrics address {address:?}: {source}")]
    MetricsAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },

    #[error("metrics exporter: {0}")]
    Metrics(#[from] BuildError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("config watcher: {0}")]
    Watch(#[from] notify::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_metrics_address_error_keeps_its_source() {
        let source = "not-an-addr".parse::<std::net::SocketAddr>().unwrap_err();
        let err = GatewayError::MetricsAddress {
            address: "not-an-addr".to_string(),
            source,
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("invalid metrics address \"not-an-addr\""));
    }
}
