//! Tunnel configuration sources

use crate::error::{Error, Result};
use crate::types::RelayConfig;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Anything that can produce the live tunnel configuration
pub trait ConfigSource: Send + Sync {
    fn load(&self) -> Result<RelayConfig>;
}

/// Tunnel configuration stored as a YAML file
#[derive(Debug, Clone)]
pub struct TunnelConfigFile {
    path: PathBuf,
}

impl TunnelConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigSource for TunnelConfigFile {
    fn load(&self) -> Result<RelayConfig> {
        if !self.path.exists() {
            return Err(Error::config_not_found(self.path.display().to_string()));
        }

        debug!("Loading tunnel config from {}", self.path.display());
        let content = fs::read_to_string(&self.path)?;
        let config: RelayConfig = serde_yaml_ng::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

/// An in-memory configuration is its own source
impl ConfigSource for RelayConfig {
    fn load(&self) -> Result<RelayConfig> {
        Ok(self.clone())
    }
}
