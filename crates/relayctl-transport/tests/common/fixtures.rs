//! Tunnel and backend fixtures

use relayctl_core::types::{DnsttSettings, ShadowsocksSettings};
use relayctl_core::{BackendConfig, BackendKind, TransportKind, TunnelConfig};

pub const PREFIX: &str = "relayctl";

pub fn tunnel(tag: &str, transport: TransportKind) -> TunnelConfig {
    TunnelConfig {
        tag: tag.to_string(),
        transport,
        backend: "backend".to_string(),
        domain: "t.example.com".to_string(),
        port: 5300,
        dnstt: None,
    }
}

pub fn dnstt_tunnel_with_mtu(tag: &str, mtu: u16) -> TunnelConfig {
    TunnelConfig {
        dnstt: Some(DnsttSettings { mtu: Some(mtu) }),
        ..tunnel(tag, TransportKind::Dnstt)
    }
}

pub fn backend(kind: BackendKind) -> BackendConfig {
    BackendConfig {
        tag: "backend".to_string(),
        kind,
        address: None,
        shadowsocks: None,
    }
}

pub fn shadowsocks_backend(method: Option<&str>) -> BackendConfig {
    BackendConfig {
        shadowsocks: Some(ShadowsocksSettings {
            password: "s3cret".to_string(),
            method: method.map(String::from),
        }),
        ..backend(BackendKind::Shadowsocks)
    }
}
