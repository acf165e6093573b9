//! Type definitions shared across relayctl crates

mod descriptor;
mod runtime_config;
mod tunnel;

pub use descriptor::ServiceDescriptor;
pub use runtime_config::{GitHubConfig, NetworkConfig, PathsConfig, RuntimeConfig, ServiceConfig};
pub use tunnel::{
    BackendConfig, BackendKind, DnsttSettings, RelayConfig, ShadowsocksSettings, TransportKind,
    TunnelConfig,
};
