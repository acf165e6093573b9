//! Per-invocation wiring of configuration and collaborators

use anyhow::{Context, Result};
use camino::Utf8Path;
use relayctl_binaries::{BinaryStore, Catalog, Platform};
use relayctl_core::{
    ConfigSource, Diagnostics, RelayConfig, RuntimeConfig, RuntimeConfigLoader, SystemctlManager,
    TunnelConfigFile,
};
use relayctl_transport::{FileMaterialStore, TransportBuilder};
use std::sync::Arc;
use tracing::debug;

use crate::output;

pub struct AppContext {
    pub config: RuntimeConfig,
    pub diagnostics: Diagnostics,
    show_progress: bool,
}

impl AppContext {
    pub fn load(config_path: Option<&Utf8Path>, quiet: bool) -> Result<Self> {
        let loader = match config_path {
            Some(path) => RuntimeConfigLoader::with_path(path.as_std_path()),
            None => RuntimeConfigLoader::new(),
        };
        let config = loader.load().context("Failed to load runtime config")?;
        debug!(
            "Using bin dir {} and tunnels {}",
            config.paths.bin_dir.display(),
            config.paths.tunnels.display()
        );

        Ok(Self {
            config,
            diagnostics: Diagnostics::new(),
            show_progress: !quiet,
        })
    }

    pub fn platform(&self) -> Result<Platform> {
        Ok(Platform::detect()?)
    }

    pub fn store(&self) -> Result<Arc<BinaryStore>> {
        let client = reqwest::Client::builder()
            .user_agent(&self.config.network.user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        let store = BinaryStore::new(
            Catalog::builtin(),
            &self.config.paths.bin_dir,
            self.platform()?,
        )?
        .with_client(client)
        .with_progress(self.show_progress);

        Ok(Arc::new(store))
    }

    pub fn services(&self) -> Arc<SystemctlManager> {
        Arc::new(SystemctlManager::new(
            &self.config.service.unit_dir,
            &self.config.service.user,
        ))
    }

    pub fn tunnel_source(&self) -> Arc<TunnelConfigFile> {
        Arc::new(TunnelConfigFile::new(&self.config.paths.tunnels))
    }

    pub fn relay_config(&self) -> Result<RelayConfig> {
        self.tunnel_source().load().with_context(|| {
            format!(
                "Failed to load tunnel config {}",
                self.config.paths.tunnels.display()
            )
        })
    }

    pub fn transport_builder(&self) -> Result<TransportBuilder> {
        let material = Arc::new(FileMaterialStore::new(&self.config.paths.material_dir));

        Ok(TransportBuilder::new(
            self.store()?,
            material.clone(),
            material,
            &self.config.paths.config_dir,
            &self.config.service.name_prefix,
        )
        .with_service_user(&self.config.service.user)
        .with_diagnostics(self.diagnostics.clone()))
    }

    pub fn name_prefix(&self) -> &str {
        &self.config.service.name_prefix
    }

    /// Print everything reported on the diagnostics channel
    pub fn report_diagnostics(&self) {
        for diagnostic in self.diagnostics.entries() {
            output::warning(&diagnostic.to_string());
        }
    }
}
