//! Configuration loading

mod loader;
mod tunnels;

pub use loader::{RuntimeConfigLoader, DEFAULT_RUNTIME_CONFIG};
pub use tunnels::{ConfigSource, TunnelConfigFile};
