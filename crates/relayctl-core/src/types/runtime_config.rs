//! Runtime configuration types for operational parameters
//!
//! These types define where relayctl keeps its managed binaries, version
//! manifest, tunnel configuration, and how it talks to upstream services.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Filesystem locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Service manager settings
    #[serde(default)]
    pub service: ServiceConfig,

    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// GitHub repository settings for self-update
    #[serde(default)]
    pub github: GitHubConfig,
}

/// Filesystem locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PathsConfig {
    /// Managed directory holding downloaded transport binaries
    #[serde(default = "default_bin_dir")]
    pub bin_dir: PathBuf,

    /// Root of per-tunnel configuration directories
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// Installed-version manifest
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    /// Tunnel and backend configuration file
    #[serde(default = "default_tunnels")]
    pub tunnels: PathBuf,

    /// Pre-provisioned certificates and keys, one directory per domain
    #[serde(default = "default_material_dir")]
    pub material_dir: PathBuf,

    /// Where relayctl itself lives when the running path cannot be resolved
    #[serde(default = "default_self_install_path")]
    pub self_install_path: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            bin_dir: default_bin_dir(),
            config_dir: default_config_dir(),
            manifest: default_manifest(),
            tunnels: default_tunnels(),
            material_dir: default_material_dir(),
            self_install_path: default_self_install_path(),
        }
    }
}

fn default_bin_dir() -> PathBuf {
    PathBuf::from("/usr/local/lib/relayctl/bin")
}
fn default_config_dir() -> PathBuf {
    PathBuf::from("/etc/relayctl")
}
fn default_manifest() -> PathBuf {
    PathBuf::from("/etc/relayctl/versions.json")
}
fn default_tunnels() -> PathBuf {
    PathBuf::from("/etc/relayctl/tunnels.yaml")
}
fn default_material_dir() -> PathBuf {
    PathBuf::from("/etc/relayctl/material")
}
fn default_self_install_path() -> PathBuf {
    PathBuf::from("/usr/local/bin/relayctl")
}

/// Service manager settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServiceConfig {
    /// Account the tunnel services run as
    #[serde(default = "default_service_user")]
    pub user: String,

    /// Directory unit files are written to
    #[serde(default = "default_unit_dir")]
    pub unit_dir: PathBuf,

    /// Prefix for per-tunnel service names
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            user: default_service_user(),
            unit_dir: default_unit_dir(),
            name_prefix: default_name_prefix(),
        }
    }
}

fn default_service_user() -> String {
    "relayctl".to_string()
}
fn default_unit_dir() -> PathBuf {
    PathBuf::from("/etc/systemd/system")
}
fn default_name_prefix() -> String {
    "relayctl".to_string()
}

/// Network and HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!(
        "relayctl/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// GitHub repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GitHubConfig {
    /// API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Repository owner
    #[serde(default = "default_repo_owner")]
    pub repo_owner: String,

    /// Repository name
    #[serde(default = "default_repo_name")]
    pub repo_name: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            repo_owner: default_repo_owner(),
            repo_name: default_repo_name(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_repo_owner() -> String {
    "relayctl".to_string()
}
fn default_repo_name() -> String {
    "relayctl".to_string()
}
