//! Error types for relayctl-core

use thiserror::Error;

/// Result type alias using relayctl-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for relayctl
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tunnel tag not present in the tunnel configuration
    #[error("Unknown tunnel: {tag}")]
    UnknownTunnel { tag: String },

    /// Backend tag not present in the tunnel configuration
    #[error("Tunnel {tunnel} references unknown backend: {backend}")]
    UnknownBackend { tunnel: String, backend: String },

    /// Service manager call failed
    #[error("Service {name}: {message}")]
    Service { name: String, message: String },
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an unknown tunnel error
    pub fn unknown_tunnel(tag: impl Into<String>) -> Self {
        Self::UnknownTunnel { tag: tag.into() }
    }

    /// Create a service error
    pub fn service(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            name: name.into(),
            message: message.into(),
        }
    }
}
