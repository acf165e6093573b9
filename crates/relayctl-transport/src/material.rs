//! Certificate and key material
//!
//! Cryptographic generation is outside relayctl. The builder only needs a
//! path and fingerprint for a domain's certificate and a path and public key
//! for its dnstt key pair; these traits are that seam.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

const CERT_FILE: &str = "cert.pem";
const CERT_KEY_FILE: &str = "key.pem";
const PRIVATE_KEY_FILE: &str = "server.key";
const PUBLIC_KEY_FILE: &str = "server.pub";

/// TLS certificate used by slipstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    /// Lowercase hex SHA-256 of the certificate file
    pub fingerprint: String,
}

/// dnstt server key pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPairInfo {
    pub private_key_path: PathBuf,
    pub public_key_path: PathBuf,
    /// Public key as clients configure it
    pub public_key: String,
}

pub trait CertificateProvider: Send + Sync {
    fn get_or_create(&self, domain: &str) -> Result<CertificateInfo>;
}

pub trait KeyProvider: Send + Sync {
    fn get_or_create(&self, domain: &str) -> Result<KeyPairInfo>;
}

/// Pre-provisioned material under `<root>/<domain>/`
///
/// Never generates anything; missing files are reported as unavailable.
#[derive(Debug, Clone)]
pub struct FileMaterialStore {
    root: PathBuf,
}

impl FileMaterialStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn domain_dir(&self, domain: &str) -> Option<PathBuf> {
        let valid = !domain.is_empty()
            && domain != "."
            && domain != ".."
            && !domain.contains(|c: char| c == '/' || c == '\\');
        valid.then(|| self.root.join(domain))
    }
}

fn require(path: &Path) -> std::result::Result<(), String> {
    if path.is_file() {
        Ok(())
    } else {
        Err(format!("{} does not exist", path.display()))
    }
}

impl CertificateProvider for FileMaterialStore {
    fn get_or_create(&self, domain: &str) -> Result<CertificateInfo> {
        let unavailable = |reason: String| Error::CertificateMaterial {
            domain: domain.to_string(),
            reason,
        };

        let dir = self
            .domain_dir(domain)
            .ok_or_else(|| unavailable("invalid domain".to_string()))?;
        let cert_path = dir.join(CERT_FILE);
        let key_path = dir.join(CERT_KEY_FILE);
        require(&cert_path).map_err(unavailable)?;
        require(&key_path).map_err(unavailable)?;

        let fingerprint = hex::encode(Sha256::digest(fs::read(&cert_path)?));
        debug!("Certificate for {} has fingerprint {}", domain, fingerprint);

        Ok(CertificateInfo {
            cert_path,
            key_path,
            fingerprint,
        })
    }
}

impl KeyProvider for FileMaterialStore {
    fn get_or_create(&self, domain: &str) -> Result<KeyPairInfo> {
        let unavailable = |reason: String| Error::KeyMaterial {
            domain: domain.to_string(),
            reason,
        };

        let dir = self
            .domain_dir(domain)
            .ok_or_else(|| unavailable("invalid domain".to_string()))?;
        let private_key_path = dir.join(PRIVATE_KEY_FILE);
        let public_key_path = dir.join(PUBLIC_KEY_FILE);
        require(&private_key_path).map_err(unavailable)?;
        require(&public_key_path).map_err(unavailable)?;

        let public_key = fs::read_to_string(&public_key_path)?.trim().to_string();
        if public_key.is_empty() {
            return Err(unavailable(format!("{} is empty", public_key_path.display())));
        }

        Ok(KeyPairInfo {
            private_key_path,
            public_key_path,
            public_key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_certificate_found_with_fingerprint() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("t.example.com");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CERT_FILE), b"cert").unwrap();
        fs::write(dir.join(CERT_KEY_FILE), b"key").unwrap();

        let store = FileMaterialStore::new(root.path());
        let info = CertificateProvider::get_or_create(&store, "t.example.com").unwrap();

        assert_eq!(info.cert_path, dir.join("cert.pem"));
        assert_eq!(info.key_path, dir.join("key.pem"));
        assert_eq!(info.fingerprint.len(), 64);
        assert_eq!(info.fingerprint, hex::encode(Sha256::digest(b"cert")));
    }

    #[test]
    fn test_missing_certificate_names_domain() {
        let root = TempDir::new().unwrap();
        let store = FileMaterialStore::new(root.path());

        let err = CertificateProvider::get_or_create(&store, "t.example.com").unwrap_err();
        assert!(matches!(err, Error::CertificateMaterial { ref domain, .. } if domain == "t.example.com"));
    }

    #[test]
    fn test_key_pair_reads_public_key() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("d.example.com");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(PRIVATE_KEY_FILE), b"priv").unwrap();
        fs::write(dir.join(PUBLIC_KEY_FILE), b"abcdef0123\n").unwrap();

        let store = FileMaterialStore::new(root.path());
        let info = KeyProvider::get_or_create(&store, "d.example.com").unwrap();
        assert_eq!(info.public_key, "abcdef0123");
        assert_eq!(info.private_key_path, dir.join("server.key"));
    }

    #[test]
    fn test_path_like_domains_rejected() {
        let store = FileMaterialStore::new("/etc/relayctl/material");
        assert!(store.domain_dir("../etc").is_none());
        assert!(store.domain_dir("..").is_none());
        assert!(store.domain_dir("").is_none());
        assert!(KeyProvider::get_or_create(&store, "a/b").is_err());
    }
}
