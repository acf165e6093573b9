//! Transport command builder
//!
//! Branches on transport kind:
//! - slipstream with a Shadowsocks backend runs `ssserver` with slipstream
//!   as its plugin, configured through a generated JSON file
//! - slipstream with any other backend runs standalone
//! - dnstt runs standalone and cannot carry Shadowsocks
//!
//! The only side effects are creating the tunnel's config directory and,
//! for the plugin path, writing the generated config.

use relayctl_binaries::{BinaryLocator, BinaryType};
use relayctl_core::{
    BackendConfig, BackendKind, Diagnostics, ServiceDescriptor, ServiceManager, TransportKind,
    TunnelConfig,
};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::material::{CertificateInfo, CertificateProvider, KeyProvider};
use crate::ownership::chown_best_effort;

/// Cipher used when a Shadowsocks backend does not name one
pub const DEFAULT_SS_METHOD: &str = "aes-256-gcm";

/// dnstt MTU when the tunnel does not override it
pub const DEFAULT_DNSTT_MTU: u16 = 1232;

const LOOPBACK: &str = "127.0.0.1";
const DNS_PORT: u16 = 53;
const SS_CONFIG_FILE: &str = "config.json";

/// Where a tunnel process listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindOptions {
    pub address: String,
    /// `None` uses the tunnel's configured port
    pub port: Option<u16>,
}

impl Default for BindOptions {
    /// Loopback on the tunnel's own port, behind a shared DNS front
    fn default() -> Self {
        Self {
            address: LOOPBACK.to_string(),
            port: None,
        }
    }
}

impl BindOptions {
    /// A single tunnel owning port 53 on `address`
    pub fn exclusive(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: Some(DNS_PORT),
        }
    }

    fn port_for(&self, tunnel: &TunnelConfig) -> u16 {
        self.port.unwrap_or(tunnel.port)
    }
}

/// Generated Shadowsocks server config for plugin mode
#[derive(Debug, Serialize)]
struct ShadowsocksServerConfig<'a> {
    server: &'a str,
    server_port: u16,
    password: &'a str,
    method: &'a str,
    mode: &'a str,
    plugin: String,
    plugin_opts: String,
    plugin_mode: &'a str,
}

/// Builds service descriptors for tunnels
pub struct TransportBuilder {
    locator: Arc<dyn BinaryLocator>,
    certs: Arc<dyn CertificateProvider>,
    keys: Arc<dyn KeyProvider>,
    config_root: PathBuf,
    name_prefix: String,
    service_user: Option<String>,
    diagnostics: Diagnostics,
}

impl TransportBuilder {
    /// `config_root` holds one `tunnels/<tag>` directory per tunnel
    pub fn new(
        locator: Arc<dyn BinaryLocator>,
        certs: Arc<dyn CertificateProvider>,
        keys: Arc<dyn KeyProvider>,
        config_root: impl Into<PathBuf>,
        name_prefix: impl Into<String>,
    ) -> Self {
        Self {
            locator,
            certs,
            keys,
            config_root: config_root.into(),
            name_prefix: name_prefix.into(),
            service_user: None,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Hand generated files to this account after writing them
    pub fn with_service_user(mut self, user: impl Into<String>) -> Self {
        self.service_user = Some(user.into());
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn tunnel_dir(&self, tunnel: &TunnelConfig) -> PathBuf {
        self.config_root.join("tunnels").join(&tunnel.tag)
    }

    /// Build the descriptor for one tunnel
    pub fn build(
        &self,
        tunnel: &TunnelConfig,
        backend: &BackendConfig,
        opts: &BindOptions,
    ) -> Result<ServiceDescriptor> {
        match (tunnel.transport, backend.kind) {
            (TransportKind::Dnstt, BackendKind::Shadowsocks) => Err(Error::ShadowsocksOverDnstt {
                tunnel: tunnel.tag.clone(),
            }),
            (TransportKind::Dnstt, _) => self.build_dnstt(tunnel, backend, opts),
            (TransportKind::Slipstream, BackendKind::Shadowsocks) => {
                self.build_slipstream_plugin(tunnel, backend, opts)
            }
            (TransportKind::Slipstream, _) => self.build_slipstream(tunnel, backend, opts),
        }
    }

    /// Replace a tunnel's service definition with a freshly built one
    ///
    /// Used when moving port 53 between tunnels. Stops and removes the old
    /// service first; a failure part-way leaves whatever was already done.
    pub async fn regenerate(
        &self,
        services: &dyn ServiceManager,
        tunnel: &TunnelConfig,
        backend: &BackendConfig,
        opts: &BindOptions,
    ) -> Result<ServiceDescriptor> {
        let name = tunnel.service_name(&self.name_prefix);

        if services.is_service_active(&name).await {
            info!("Stopping {} for regeneration", name);
            services.stop_service(&name).await?;
        }

        if services.service_exists(&name).await {
            services.remove_service(&name).await?;
        }

        let descriptor = self.build(tunnel, backend, opts)?;
        services.create_service(&descriptor).await?;

        info!("Regenerated {} listening on {}:{}", name, opts.address, opts.port_for(tunnel));
        Ok(descriptor)
    }

    fn build_slipstream_plugin(
        &self,
        tunnel: &TunnelConfig,
        backend: &BackendConfig,
        opts: &BindOptions,
    ) -> Result<ServiceDescriptor> {
        let ss = backend
            .shadowsocks
            .as_ref()
            .ok_or_else(|| Error::missing(&tunnel.tag, "shadowsocks"))?;

        let ssserver = self.locator.locate(BinaryType::SsServer)?;
        let slipstream = self.locator.locate(BinaryType::SlipstreamServer)?;
        let cert = self.certificate(tunnel)?;

        let port = opts.port_for(tunnel);
        let plugin_opts = format!(
            "domain={};dns-listen-host={};dns-listen-port={};cert={};key={}",
            tunnel.domain,
            opts.address,
            port,
            cert.cert_path.display(),
            cert.key_path.display()
        );

        let config = ShadowsocksServerConfig {
            server: &opts.address,
            server_port: port,
            password: &ss.password,
            method: ss.method.as_deref().unwrap_or(DEFAULT_SS_METHOD),
            mode: "tcp_only",
            plugin: slipstream.display().to_string(),
            plugin_opts,
            plugin_mode: "tcp_only",
        };

        let config_dir = self.prepare_dir(tunnel)?;
        let config_path = config_dir.join(SS_CONFIG_FILE);
        write_private(&config_path, &serde_json::to_vec_pretty(&config)?)?;
        debug!("Wrote plugin config {}", config_path.display());
        self.hand_over(&config_dir);

        let exec_start = format!("{} -c {}", ssserver.display(), config_path.display());
        Ok(self.descriptor(
            tunnel,
            exec_start,
            config_dir,
            vec![ssserver, slipstream, cert.cert_path, cert.key_path],
            port,
        ))
    }

    fn build_slipstream(
        &self,
        tunnel: &TunnelConfig,
        backend: &BackendConfig,
        opts: &BindOptions,
    ) -> Result<ServiceDescriptor> {
        let target = backend
            .target_address()
            .ok_or_else(|| Error::missing(&tunnel.tag, "backend address"))?;

        let slipstream = self.locator.locate(BinaryType::SlipstreamServer)?;
        let cert = self.certificate(tunnel)?;
        let config_dir = self.prepare_dir(tunnel)?;
        let port = opts.port_for(tunnel);

        let exec_start = format!(
            "{} --dns-listen-host {} --dns-listen-port {} --domain {} --target-address {} --cert {} --key {}",
            slipstream.display(),
            opts.address,
            port,
            tunnel.domain,
            target,
            cert.cert_path.display(),
            cert.key_path.display()
        );

        Ok(self.descriptor(
            tunnel,
            exec_start,
            config_dir,
            vec![slipstream, cert.cert_path, cert.key_path],
            port,
        ))
    }

    fn build_dnstt(
        &self,
        tunnel: &TunnelConfig,
        backend: &BackendConfig,
        opts: &BindOptions,
    ) -> Result<ServiceDescriptor> {
        let target = backend
            .target_address()
            .ok_or_else(|| Error::missing(&tunnel.tag, "backend address"))?;

        let dnstt = self.locator.locate(BinaryType::DnsttServer)?;
        let keys = self.keys.get_or_create(&tunnel.domain)?;
        if let Some(dir) = keys.private_key_path.parent() {
            self.hand_over(dir);
        }

        let config_dir = self.prepare_dir(tunnel)?;
        let port = opts.port_for(tunnel);
        let mtu = tunnel
            .dnstt
            .as_ref()
            .and_then(|d| d.mtu)
            .unwrap_or(DEFAULT_DNSTT_MTU);

        let exec_start = format!(
            "{} -udp {} -privkey-file {} -mtu {} {} {}",
            dnstt.display(),
            socket_addr(&opts.address, port),
            keys.private_key_path.display(),
            mtu,
            tunnel.domain,
            target
        );

        Ok(self.descriptor(
            tunnel,
            exec_start,
            config_dir,
            vec![dnstt, keys.private_key_path],
            port,
        ))
    }

    fn certificate(&self, tunnel: &TunnelConfig) -> Result<CertificateInfo> {
        let cert = self.certs.get_or_create(&tunnel.domain)?;
        if let Some(dir) = cert.cert_path.parent() {
            self.hand_over(dir);
        }
        Ok(cert)
    }

    fn prepare_dir(&self, tunnel: &TunnelConfig) -> Result<PathBuf> {
        let dir = self.tunnel_dir(tunnel);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn hand_over(&self, path: &Path) {
        if let Some(user) = &self.service_user {
            chown_best_effort(path, user, &self.diagnostics);
        }
    }

    fn descriptor(
        &self,
        tunnel: &TunnelConfig,
        exec_start: String,
        config_dir: PathBuf,
        read_only_paths: Vec<PathBuf>,
        port: u16,
    ) -> ServiceDescriptor {
        ServiceDescriptor {
            name: tunnel.service_name(&self.name_prefix),
            exec_start,
            read_write_paths: vec![config_dir.clone()],
            config_dir,
            read_only_paths,
            binds_privileged_port: ServiceDescriptor::is_privileged_port(port),
        }
    }
}

/// `host:port`, bracketing IPv6 literals
fn socket_addr(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// Write a file readable only by its owner
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}
