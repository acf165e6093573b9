//! Recording service manager

use async_trait::async_trait;
use relayctl_core::{Error, Result, ServiceDescriptor, ServiceManager};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

/// One call made against the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    Create(String),
    Stop(String),
    Start(String),
    Remove(String),
}

/// Records control calls; state checks are not recorded
#[derive(Debug, Default)]
pub struct RecordingServiceManager {
    active: Mutex<HashSet<String>>,
    existing: Mutex<HashSet<String>>,
    fail_stop: HashSet<String>,
    fail_start: HashSet<String>,
    calls: Mutex<Vec<ServiceCall>>,
    obstruct_on_stop: Option<PathBuf>,
    descriptors: Mutex<Vec<ServiceDescriptor>>,
}

impl RecordingServiceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Services that exist and are running
    pub fn with_active(self, names: &[&str]) -> Self {
        for name in names {
            self.active.lock().unwrap().insert(name.to_string());
            self.existing.lock().unwrap().insert(name.to_string());
        }
        self
    }

    pub fn failing_stop(mut self, name: &str) -> Self {
        self.fail_stop.insert(name.to_string());
        self
    }

    pub fn failing_start(mut self, name: &str) -> Self {
        self.fail_start.insert(name.to_string());
        self
    }

    /// On a successful stop, turn `path` into a non-empty directory so a
    /// later write to it fails
    pub fn obstructing_on_stop(mut self, path: impl Into<PathBuf>) -> Self {
        self.obstruct_on_stop = Some(path.into());
        self
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stops(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ServiceCall::Stop(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn starts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ServiceCall::Start(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn descriptors(&self) -> Vec<ServiceDescriptor> {
        self.descriptors.lock().unwrap().clone()
    }

    fn record(&self, call: ServiceCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ServiceManager for RecordingServiceManager {
    async fn create_service(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        self.record(ServiceCall::Create(descriptor.name.clone()));
        self.existing.lock().unwrap().insert(descriptor.name.clone());
        self.descriptors.lock().unwrap().push(descriptor.clone());
        Ok(())
    }

    async fn is_service_active(&self, name: &str) -> bool {
        self.active.lock().unwrap().contains(name)
    }

    async fn service_exists(&self, name: &str) -> bool {
        self.existing.lock().unwrap().contains(name)
    }

    async fn stop_service(&self, name: &str) -> Result<()> {
        self.record(ServiceCall::Stop(name.to_string()));
        if self.fail_stop.contains(name) {
            return Err(Error::service(name, "stop refused"));
        }
        self.active.lock().unwrap().remove(name);
        if let Some(path) = &self.obstruct_on_stop {
            let _ = fs::remove_file(path);
            fs::create_dir_all(path.join("occupied")).unwrap();
        }
        Ok(())
    }

    async fn start_service(&self, name: &str) -> Result<()> {
        self.record(ServiceCall::Start(name.to_string()));
        if self.fail_start.contains(name) {
            return Err(Error::service(name, "start refused"));
        }
        self.active.lock().unwrap().insert(name.to_string());
        Ok(())
    }

    async fn remove_service(&self, name: &str) -> Result<()> {
        self.record(ServiceCall::Remove(name.to_string()));
        self.existing.lock().unwrap().remove(name);
        self.active.lock().unwrap().remove(name);
        Ok(())
    }
}

/// Tunnel configuration source that always fails
pub struct BrokenConfig;

impl relayctl_core::ConfigSource for BrokenConfig {
    fn load(&self) -> Result<relayctl_core::RelayConfig> {
        Err(Error::invalid_config("tunnels.yaml: mapping values are not allowed here"))
    }
}
