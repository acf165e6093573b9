//! Service descriptor handed to the external service manager

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ports below this value require a privileged bind
const PRIVILEGED_PORT_LIMIT: u16 = 1024;

/// Everything the service manager needs to supervise one tunnel process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Unit name (without the `.service` suffix)
    pub name: String,

    /// Full command line, executable first
    pub exec_start: String,

    /// Per-tunnel configuration directory
    pub config_dir: PathBuf,

    /// Paths the process may read
    pub read_only_paths: Vec<PathBuf>,

    /// Paths the process may write
    pub read_write_paths: Vec<PathBuf>,

    /// Whether the process binds a port below 1024
    pub binds_privileged_port: bool,
}

impl ServiceDescriptor {
    /// Whether binding `port` needs CAP_NET_BIND_SERVICE
    pub fn is_privileged_port(port: u16) -> bool {
        port < PRIVILEGED_PORT_LIMIT
    }
}
