//! Installed-version manifest
//!
//! Persistent JSON record of which version of each binary is on disk. A
//! missing file is an empty manifest. Writes go through a temporary file in
//! the same directory so a crash never leaves a truncated manifest behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::catalog::BinaryType;
use crate::error::{Error, Result};

/// Installed versions keyed by binary, plus last-write time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionManifest {
    #[serde(rename = "dnstt-server", default, skip_serializing_if = "Option::is_none")]
    pub dnstt_server: Option<String>,

    #[serde(rename = "slipstream-server", default, skip_serializing_if = "Option::is_none")]
    pub slipstream_server: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssserver: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microsocks: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl VersionManifest {
    /// Load from disk; an absent file yields an empty manifest
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No version manifest at {}, starting empty", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| Error::ManifestMalformed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Persist atomically, refreshing `updated_at`
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.updated_at = Some(Utc::now());

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let mut staged = tempfile::Builder::new()
            .prefix(".versions.")
            .suffix(".tmp")
            .tempfile_in(parent)?;
        staged.write_all(json.as_bytes())?;
        staged.write_all(b"\n")?;
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(std::io::Error::from)?;

        debug!("Saved version manifest to {}", path.display());
        Ok(())
    }

    /// Recorded version, if any
    pub fn get(&self, binary: BinaryType) -> Option<&str> {
        self.slot(binary).as_deref()
    }

    pub fn set(&mut self, binary: BinaryType, version: impl Into<String>) {
        *self.slot_mut(binary) = Some(version.into());
    }

    fn slot(&self, binary: BinaryType) -> &Option<String> {
        match binary {
            BinaryType::DnsttServer => &self.dnstt_server,
            BinaryType::SlipstreamServer => &self.slipstream_server,
            BinaryType::SsServer => &self.ssserver,
            BinaryType::Microsocks => &self.microsocks,
        }
    }

    fn slot_mut(&mut self, binary: BinaryType) -> &mut Option<String> {
        match binary {
            BinaryType::DnsttServer => &mut self.dnstt_server,
            BinaryType::SlipstreamServer => &mut self.slipstream_server,
            BinaryType::SsServer => &mut self.ssserver,
            BinaryType::Microsocks => &mut self.microsocks,
        }
    }
}
