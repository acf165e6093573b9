//! Tunnel and backend configuration types
//!
//! A tunnel pairs a transport kind with a backend, a domain and a bind port.
//! These types are read-only inputs: relayctl consults them to find which
//! services depend on a binary and to build process invocations.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Default target for a SOCKS backend without an explicit address
pub const DEFAULT_SOCKS_TARGET: &str = "127.0.0.1:1080";

/// Default target for an SSH backend without an explicit address
pub const DEFAULT_SSH_TARGET: &str = "127.0.0.1:22";

/// Which tunneling protocol family a tunnel uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// QUIC-over-DNS obfuscation tunnel; can run standalone or as a Shadowsocks plugin
    Slipstream,
    /// DNS tunnel protocol with its own key pair; has no plugin hook
    Dnstt,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slipstream => write!(f, "slipstream"),
            Self::Dnstt => write!(f, "dnstt"),
        }
    }
}

/// Final-hop target a tunnel forwards traffic to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Socks,
    Ssh,
    Shadowsocks,
    Custom,
}

impl BackendKind {
    /// Target address used when the backend declares none
    pub fn default_target(&self) -> Option<&'static str> {
        match self {
            Self::Socks => Some(DEFAULT_SOCKS_TARGET),
            Self::Ssh => Some(DEFAULT_SSH_TARGET),
            Self::Shadowsocks | Self::Custom => None,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Socks => write!(f, "socks"),
            Self::Ssh => write!(f, "ssh"),
            Self::Shadowsocks => write!(f, "shadowsocks"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// DNS tunnel protocol settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DnsttSettings {
    /// Maximum transmission unit for DNS responses
    #[serde(default)]
    pub mtu: Option<u16>,
}

/// One configured tunnel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TunnelConfig {
    /// Unique tunnel tag
    pub tag: String,

    /// Transport protocol family
    pub transport: TransportKind,

    /// Tag of the backend this tunnel forwards to
    pub backend: String,

    /// Delegated domain the tunnel answers for
    pub domain: String,

    /// Port the tunnel listens on in the multi-tunnel posture
    pub port: u16,

    /// DNS tunnel protocol settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dnstt: Option<DnsttSettings>,
}

impl TunnelConfig {
    /// Service name for this tunnel under the given prefix
    pub fn service_name(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.tag)
    }
}

/// Shadowsocks backend settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ShadowsocksSettings {
    /// Shared secret
    pub password: String,

    /// AEAD cipher; the builder falls back to aes-256-gcm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

/// One configured backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BackendConfig {
    /// Unique backend tag
    pub tag: String,

    /// Backend kind
    pub kind: BackendKind,

    /// Explicit `host:port` target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Shadowsocks settings, required when kind is shadowsocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadowsocks: Option<ShadowsocksSettings>,
}

impl BackendConfig {
    /// Explicit address, else the kind's default target
    pub fn target_address(&self) -> Option<String> {
        self.address
            .clone()
            .or_else(|| self.kind.default_target().map(String::from))
    }
}

/// Complete tunnel configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RelayConfig {
    #[serde(default)]
    pub tunnels: Vec<TunnelConfig>,

    #[serde(default)]
    pub backends: Vec<BackendConfig>,
}

impl RelayConfig {
    /// Look up a tunnel by tag
    pub fn tunnel(&self, tag: &str) -> Result<&TunnelConfig> {
        self.tunnels
            .iter()
            .find(|t| t.tag == tag)
            .ok_or_else(|| Error::unknown_tunnel(tag))
    }

    /// Resolve the backend a tunnel references
    pub fn backend_for(&self, tunnel: &TunnelConfig) -> Result<&BackendConfig> {
        self.backends
            .iter()
            .find(|b| b.tag == tunnel.backend)
            .ok_or_else(|| Error::UnknownBackend {
                tunnel: tunnel.tag.clone(),
                backend: tunnel.backend.clone(),
            })
    }

    /// Check tag uniqueness for tunnels and backends
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for tunnel in &self.tunnels {
            if !seen.insert(tunnel.tag.as_str()) {
                return Err(Error::invalid_config(format!(
                    "duplicate tunnel tag: {}",
                    tunnel.tag
                )));
            }
        }

        seen.clear();
        for backend in &self.backends {
            if !seen.insert(backend.tag.as_str()) {
                return Err(Error::invalid_config(format!(
                    "duplicate backend tag: {}",
                    backend.tag
                )));
            }
        }

        Ok(())
    }
}
