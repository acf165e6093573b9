//! Service dependency index
//!
//! Answers "which running tunnel services would break if this binary were
//! replaced right now". Only active services count; a stopped service does
//! not need draining.

use relayctl_binaries::BinaryType;
use relayctl_core::{
    BackendKind, ConfigSource, Diagnostic, Diagnostics, Error as CoreError, RelayConfig,
    ServiceManager, TransportKind, TunnelConfig,
};
use std::sync::Arc;
use tracing::debug;

/// Result of a dependency lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependentScan {
    /// Active services using the binary
    pub services: Vec<String>,

    /// Tunnel configuration could not be read, so `services` may be incomplete
    pub unknown: bool,
}

/// Maps a binary to the live services that depend on it
pub struct DependencyIndex {
    config: Arc<dyn ConfigSource>,
    services: Arc<dyn ServiceManager>,
    diagnostics: Diagnostics,
    name_prefix: String,
}

impl DependencyIndex {
    pub fn new(
        config: Arc<dyn ConfigSource>,
        services: Arc<dyn ServiceManager>,
        name_prefix: impl Into<String>,
    ) -> Self {
        Self {
            config,
            services,
            diagnostics: Diagnostics::new(),
            name_prefix: name_prefix.into(),
        }
    }

    /// Report scan failures to a shared diagnostics sink
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Service name of the standalone SOCKS micro-proxy
    pub fn microsocks_service(&self) -> String {
        format!("{}-{}", self.name_prefix, BinaryType::Microsocks)
    }

    /// Active services that depend on `binary`
    ///
    /// An unreadable tunnel configuration yields an empty list flagged
    /// `unknown` and a diagnostic; a missing configuration file means no
    /// tunnels are configured.
    pub async fn services_depending_on(&self, binary: BinaryType) -> DependentScan {
        if binary == BinaryType::Microsocks {
            let name = self.microsocks_service();
            let services = if self.services.is_service_active(&name).await {
                vec![name]
            } else {
                Vec::new()
            };
            return DependentScan {
                services,
                unknown: false,
            };
        }

        let config = match self.config.load() {
            Ok(config) => config,
            Err(CoreError::ConfigNotFound { .. }) => {
                debug!("No tunnel configuration, {} has no dependents", binary);
                return DependentScan::default();
            }
            Err(e) => {
                self.diagnostics.report(Diagnostic::DependencyScanFailed {
                    binary: binary.to_string(),
                    reason: e.to_string(),
                });
                return DependentScan {
                    services: Vec::new(),
                    unknown: true,
                };
            }
        };

        let mut services = Vec::new();
        for tunnel in &config.tunnels {
            if !tunnel_uses(&config, tunnel, binary) {
                continue;
            }

            let name = tunnel.service_name(&self.name_prefix);
            if self.services.is_service_active(&name).await {
                debug!("{} depends on {}", name, binary);
                services.push(name);
            }
        }

        DependentScan {
            services,
            unknown: false,
        }
    }
}

/// Whether a tunnel's process runs `binary`
///
/// A slipstream tunnel over a Shadowsocks backend runs both the
/// Shadowsocks server and slipstream as its plugin.
fn tunnel_uses(config: &RelayConfig, tunnel: &TunnelConfig, binary: BinaryType) -> bool {
    match binary {
        BinaryType::DnsttServer => tunnel.transport == TransportKind::Dnstt,
        BinaryType::SlipstreamServer => tunnel.transport == TransportKind::Slipstream,
        BinaryType::SsServer => config
            .backend_for(tunnel)
            .is_ok_and(|backend| backend.kind == BackendKind::Shadowsocks),
        BinaryType::Microsocks => false,
    }
}
