//! Service manager seam
//!
//! Process supervision is owned by the host's service manager. relayctl only
//! needs the handful of operations below; `SystemctlManager` maps them onto
//! `systemctl` and a minimal unit file.

use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::ServiceDescriptor;

/// Operations relayctl needs from the host service manager
#[async_trait]
pub trait ServiceManager: Send + Sync {
    /// Install and enable a service from a descriptor
    async fn create_service(&self, descriptor: &ServiceDescriptor) -> Result<()>;

    /// Whether the named service is currently running
    async fn is_service_active(&self, name: &str) -> bool;

    /// Whether a definition for the named service exists
    async fn service_exists(&self, name: &str) -> bool;

    async fn stop_service(&self, name: &str) -> Result<()>;

    async fn start_service(&self, name: &str) -> Result<()>;

    /// Disable and delete the service definition
    async fn remove_service(&self, name: &str) -> Result<()>;
}

/// `systemctl`-backed service manager
#[derive(Debug, Clone)]
pub struct SystemctlManager {
    unit_dir: PathBuf,
    user: String,
}

impl SystemctlManager {
    pub fn new(unit_dir: impl Into<PathBuf>, user: impl Into<String>) -> Self {
        Self {
            unit_dir: unit_dir.into(),
            user: user.into(),
        }
    }

    fn unit_path(&self, name: &str) -> PathBuf {
        self.unit_dir.join(format!("{}.service", name))
    }

    /// Render a minimal unit file for a descriptor
    pub fn render_unit(&self, descriptor: &ServiceDescriptor) -> String {
        let mut unit = format!(
            "[Unit]\nDescription=relayctl tunnel {name}\nAfter=network-online.target\nWants=network-online.target\n\n\
             [Service]\nType=simple\nUser={user}\nGroup={user}\nExecStart={exec}\nRestart=on-failure\nRestartSec=5\n\
             NoNewPrivileges=true\nProtectSystem=strict\nProtectHome=true\nPrivateTmp=true\n",
            name = descriptor.name,
            user = self.user,
            exec = descriptor.exec_start,
        );

        if !descriptor.read_only_paths.is_empty() {
            unit.push_str(&format!(
                "ReadOnlyPaths={}\n",
                join_paths(&descriptor.read_only_paths)
            ));
        }
        if !descriptor.read_write_paths.is_empty() {
            unit.push_str(&format!(
                "ReadWritePaths={}\n",
                join_paths(&descriptor.read_write_paths)
            ));
        }
        if descriptor.binds_privileged_port {
            unit.push_str("AmbientCapabilities=CAP_NET_BIND_SERVICE\n");
            unit.push_str("CapabilityBoundingSet=CAP_NET_BIND_SERVICE\n");
        }

        unit.push_str("\n[Install]\nWantedBy=multi-user.target\n");
        unit
    }

    async fn systemctl(&self, args: &[&str]) -> std::io::Result<std::process::Output> {
        debug!("systemctl {}", args.join(" "));
        Command::new("systemctl").args(args).output().await
    }

    async fn run_checked(&self, name: &str, args: &[&str]) -> Result<()> {
        let output = self
            .systemctl(args)
            .await
            .map_err(|e| Error::service(name, format!("failed to run systemctl: {}", e)))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(Error::service(
                name,
                format!("systemctl {} failed: {}", args[0], stderr.trim()),
            ))
        }
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl ServiceManager for SystemctlManager {
    async fn create_service(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        let path = self.unit_path(&descriptor.name);
        fs::create_dir_all(&self.unit_dir)?;
        fs::write(&path, self.render_unit(descriptor))?;
        info!("Wrote unit {}", path.display());

        self.run_checked(&descriptor.name, &["daemon-reload"]).await?;
        self.run_checked(&descriptor.name, &["enable", &descriptor.name])
            .await
    }

    async fn is_service_active(&self, name: &str) -> bool {
        matches!(
            self.systemctl(&["is-active", "--quiet", name]).await,
            Ok(output) if output.status.success()
        )
    }

    async fn service_exists(&self, name: &str) -> bool {
        self.unit_path(name).exists()
    }

    async fn stop_service(&self, name: &str) -> Result<()> {
        self.run_checked(name, &["stop", name]).await
    }

    async fn start_service(&self, name: &str) -> Result<()> {
        self.run_checked(name, &["start", name]).await
    }

    async fn remove_service(&self, name: &str) -> Result<()> {
        // disable fails for units that were never enabled; removal proceeds anyway
        if let Err(e) = self.run_checked(name, &["disable", name]).await {
            debug!("{}", e);
        }

        let path = self.unit_path(name);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        self.run_checked(name, &["daemon-reload"]).await
    }
}
