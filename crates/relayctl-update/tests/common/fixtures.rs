//! Update scenario fixtures

use relayctl_binaries::{
    Arch, BinaryDefinition, BinaryStore, BinaryType, Catalog, Libc, NamingFamily, Os, Platform,
    VersionManifest,
};
use relayctl_core::{
    BackendConfig, BackendKind, RelayConfig, TransportKind, TunnelConfig,
};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

pub const NAME_PREFIX: &str = "relayctl";
pub const FAKE_BINARY_CONTENT: &[u8] = b"#!/bin/sh\nexit 0\n";

pub fn linux_amd64() -> Platform {
    Platform::new(Os::Linux, Arch::Amd64, Libc::Glibc)
}

/// Plain-download definition served at `<base>/<binary>/<version>`
pub fn definition(binary_type: BinaryType, base_url: &str, pinned: &str) -> BinaryDefinition {
    BinaryDefinition {
        binary_type,
        override_env: format!(
            "RELAYCTL_TEST_{}_PATH",
            binary_type.as_str().replace('-', "_").to_uppercase()
        ),
        url_template: format!("{}/{}/{{version}}", base_url, binary_type),
        archive: None,
        naming: NamingFamily::Generic,
        platforms: BTreeMap::from([(Os::Linux, BTreeSet::from([Arch::Amd64]))]),
        pinned_version: pinned.to_string(),
        skip_update: false,
    }
}

/// Asset path the mock server must serve for a definition built above
pub fn asset_path(binary_type: BinaryType, version: &str) -> String {
    format!("/{}/{}", binary_type, version)
}

pub fn store(catalog: Catalog, bin_dir: &Path) -> Arc<BinaryStore> {
    Arc::new(BinaryStore::new(catalog, bin_dir, linux_amd64()).unwrap())
}

pub fn tunnel(tag: &str, transport: TransportKind, backend: &str) -> TunnelConfig {
    TunnelConfig {
        tag: tag.to_string(),
        transport,
        backend: backend.to_string(),
        domain: format!("{}.t.example.com", tag),
        port: 5300,
        dnstt: None,
    }
}

pub fn backend(tag: &str, kind: BackendKind) -> BackendConfig {
    BackendConfig {
        tag: tag.to_string(),
        kind,
        address: None,
        shadowsocks: None,
    }
}

/// dnstt over SSH, slipstream over Shadowsocks, slipstream over SOCKS
pub fn mixed_relay_config() -> RelayConfig {
    RelayConfig {
        tunnels: vec![
            tunnel("dns-ssh", TransportKind::Dnstt, "ssh"),
            tunnel("slip-ss", TransportKind::Slipstream, "ss"),
            tunnel("slip-socks", TransportKind::Slipstream, "socks"),
        ],
        backends: vec![
            backend("ssh", BackendKind::Ssh),
            backend("ss", BackendKind::Shadowsocks),
            backend("socks", BackendKind::Socks),
        ],
    }
}

pub fn write_manifest(path: &Path, entries: &[(BinaryType, &str)]) {
    let mut manifest = VersionManifest::default();
    for (binary, version) in entries {
        manifest.set(*binary, *version);
    }
    manifest.save(path).unwrap();
}
