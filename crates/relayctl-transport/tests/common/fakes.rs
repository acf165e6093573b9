//! Test doubles for the builder's collaborators

use async_trait::async_trait;
use relayctl_binaries::{BinaryLocator, BinaryType};
use relayctl_core::{ServiceDescriptor, ServiceManager};
use relayctl_transport::{
    CertificateInfo, CertificateProvider, Error, KeyPairInfo, KeyProvider, Result,
};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Every binary lives at `/opt/relay/bin/<name>`
pub struct FixedLocator;

impl BinaryLocator for FixedLocator {
    fn locate(&self, binary: BinaryType) -> relayctl_binaries::Result<PathBuf> {
        Ok(PathBuf::from("/opt/relay/bin").join(binary.as_str()))
    }
}

/// Hands out material under `/opt/relay/material/<domain>` and counts calls
#[derive(Default)]
pub struct CountingMaterial {
    pub cert_calls: AtomicUsize,
    pub key_calls: AtomicUsize,
}

impl CountingMaterial {
    pub fn certs(&self) -> usize {
        self.cert_calls.load(Ordering::SeqCst)
    }

    pub fn keys(&self) -> usize {
        self.key_calls.load(Ordering::SeqCst)
    }
}

impl CertificateProvider for CountingMaterial {
    fn get_or_create(&self, domain: &str) -> Result<CertificateInfo> {
        self.cert_calls.fetch_add(1, Ordering::SeqCst);
        let dir = PathBuf::from("/opt/relay/material").join(domain);
        Ok(CertificateInfo {
            cert_path: dir.join("cert.pem"),
            key_path: dir.join("key.pem"),
            fingerprint: "00ff".to_string(),
        })
    }
}

impl KeyProvider for CountingMaterial {
    fn get_or_create(&self, domain: &str) -> Result<KeyPairInfo> {
        self.key_calls.fetch_add(1, Ordering::SeqCst);
        let dir = PathBuf::from("/opt/relay/material").join(domain);
        Ok(KeyPairInfo {
            private_key_path: dir.join("server.key"),
            public_key_path: dir.join("server.pub"),
            public_key: "feedface".to_string(),
        })
    }
}

/// Certificate provider that always fails
pub struct NoCertificates;

impl CertificateProvider for NoCertificates {
    fn get_or_create(&self, domain: &str) -> Result<CertificateInfo> {
        Err(Error::CertificateMaterial {
            domain: domain.to_string(),
            reason: "not provisioned".to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    Create(String),
    Stop(String),
    Start(String),
    Remove(String),
}

/// Records control calls against a set of existing/active services
#[derive(Default)]
pub struct RecordingServiceManager {
    active: Mutex<HashSet<String>>,
    existing: Mutex<HashSet<String>>,
    calls: Mutex<Vec<ServiceCall>>,
}

impl RecordingServiceManager {
    pub fn with_existing(names: &[&str], active: &[&str]) -> Self {
        let manager = Self::default();
        manager
            .existing
            .lock()
            .unwrap()
            .extend(names.iter().map(|n| n.to_string()));
        manager
            .active
            .lock()
            .unwrap()
            .extend(active.iter().map(|n| n.to_string()));
        manager
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ServiceCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ServiceManager for RecordingServiceManager {
    async fn create_service(&self, descriptor: &ServiceDescriptor) -> relayctl_core::Result<()> {
        self.record(ServiceCall::Create(descriptor.name.clone()));
        self.existing.lock().unwrap().insert(descriptor.name.clone());
        Ok(())
    }

    async fn is_service_active(&self, name: &str) -> bool {
        self.active.lock().unwrap().contains(name)
    }

    async fn service_exists(&self, name: &str) -> bool {
        self.existing.lock().unwrap().contains(name)
    }

    async fn stop_service(&self, name: &str) -> relayctl_core::Result<()> {
        self.record(ServiceCall::Stop(name.to_string()));
        self.active.lock().unwrap().remove(name);
        Ok(())
    }

    async fn start_service(&self, name: &str) -> relayctl_core::Result<()> {
        self.record(ServiceCall::Start(name.to_string()));
        self.active.lock().unwrap().insert(name.to_string());
        Ok(())
    }

    async fn remove_service(&self, name: &str) -> relayctl_core::Result<()> {
        self.record(ServiceCall::Remove(name.to_string()));
        self.existing.lock().unwrap().remove(name);
        Ok(())
    }
}
