//! Hierarchical runtime configuration loader
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. System config (/etc/relayctl/runtime.yaml, or an explicit path)
//! 3. Environment variables (RELAYCTL_* prefix)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::types::RuntimeConfig;
use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// System-wide runtime configuration file
pub const DEFAULT_RUNTIME_CONFIG: &str = "/etc/relayctl/runtime.yaml";

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

/// Runtime configuration loader
pub struct RuntimeConfigLoader {
    /// System configuration file; absence is not an error
    system_path: PathBuf,

    /// Whether an explicitly requested file must exist
    required: bool,
}

impl RuntimeConfigLoader {
    /// Loader for the standard system location
    pub fn new() -> Self {
        Self {
            system_path: PathBuf::from(DEFAULT_RUNTIME_CONFIG),
            required: false,
        }
    }

    /// Loader for an explicitly requested file, which must exist
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            system_path: path.into(),
            required: true,
        }
    }

    /// Load runtime configuration with hierarchical precedence
    pub fn load(&self) -> Result<RuntimeConfig> {
        let mut config = Self::load_embedded_config::<RuntimeConfig>("runtime-defaults.yaml")?;

        if self.system_path.exists() {
            debug!("Loading runtime config from {}", self.system_path.display());
            config = Self::load_yaml_file::<RuntimeConfig>(&self.system_path)?;
        } else if self.required {
            return Err(Error::config_not_found(
                self.system_path.display().to_string(),
            ));
        }

        Self::apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Load an embedded configuration file
    fn load_embedded_config<T: DeserializeOwned>(filename: &str) -> Result<T> {
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                filename, e
            ))
        })
    }

    /// Load a YAML file and parse it
    fn load_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        serde_yaml_ng::from_str(&content).map_err(|e| {
            Error::invalid_config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(config: &mut RuntimeConfig) {
        if let Some(val) = non_empty_var("RELAYCTL_BIN_DIR") {
            config.paths.bin_dir = PathBuf::from(val);
        }

        if let Some(val) = non_empty_var("RELAYCTL_CONFIG_DIR") {
            config.paths.config_dir = PathBuf::from(val);
        }

        if let Some(val) = non_empty_var("RELAYCTL_MANIFEST") {
            config.paths.manifest = PathBuf::from(val);
        }

        if let Some(val) = non_empty_var("RELAYCTL_TUNNELS_FILE") {
            config.paths.tunnels = PathBuf::from(val);
        }

        if let Some(val) = non_empty_var("RELAYCTL_SERVICE_USER") {
            config.service.user = val;
        }

        if let Some(val) = non_empty_var("RELAYCTL_GITHUB_API_URL") {
            config.github.api_url = val;
        }
    }
}

impl Default for RuntimeConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}
