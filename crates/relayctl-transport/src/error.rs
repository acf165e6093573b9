//! Error types for relayctl-transport

use thiserror::Error;

/// Result type alias using relayctl-transport's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Transport build error types
#[derive(Error, Debug)]
pub enum Error {
    /// Tunnel or backend lacks settings its transport needs
    #[error("Tunnel {tunnel} is missing required {what} configuration")]
    MissingSubConfig { tunnel: String, what: String },

    /// dnstt has no plugin hook for a Shadowsocks server
    #[error("Tunnel {tunnel} uses dnstt with a Shadowsocks backend, which dnstt cannot carry")]
    ShadowsocksOverDnstt { tunnel: String },

    /// Certificate for a domain is unavailable
    #[error("Certificate for {domain} unavailable: {reason}")]
    CertificateMaterial { domain: String, reason: String },

    /// Key pair for a domain is unavailable
    #[error("Key pair for {domain} unavailable: {reason}")]
    KeyMaterial { domain: String, reason: String },

    /// Transport binary could not be located
    #[error(transparent)]
    Binary(#[from] relayctl_binaries::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generated config could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Service manager or tunnel configuration failure
    #[error(transparent)]
    Service(#[from] relayctl_core::Error),
}

impl Error {
    pub fn missing(tunnel: impl Into<String>, what: impl Into<String>) -> Self {
        Self::MissingSubConfig {
            tunnel: tunnel.into(),
            what: what.into(),
        }
    }
}
