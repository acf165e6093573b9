//! # relayctl-core
//!
//! Core library for relayctl providing:
//! - Runtime configuration loading (embedded defaults, system file, env overrides)
//! - Tunnel and backend configuration types
//! - The service-manager seam used to drain and restart tunnel services
//! - A diagnostics channel for best-effort, non-fatal outcomes

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod service;
pub mod types;

pub use config::{ConfigSource, RuntimeConfigLoader, TunnelConfigFile};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{Error, Result};
pub use service::{ServiceManager, SystemctlManager};
pub use types::{
    BackendConfig, BackendKind, RelayConfig, RuntimeConfig, ServiceDescriptor, TransportKind,
    TunnelConfig,
};
