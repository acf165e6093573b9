//! Binary catalog
//!
//! Static registry of the transport executables relayctl provisions. The
//! catalog is an explicit value handed to the store and the update
//! orchestrator; tests build their own with local URLs.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::platform::{expand_template, Arch, NamingFamily, Os, Platform};

/// Closed set of binaries relayctl provisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BinaryType {
    /// DNS tunnel protocol server
    DnsttServer,
    /// QUIC-over-DNS obfuscation tunnel server
    SlipstreamServer,
    /// Shadowsocks-compatible server
    #[serde(rename = "ssserver")]
    SsServer,
    /// SOCKS micro-proxy
    Microsocks,
}

impl BinaryType {
    pub const ALL: [BinaryType; 4] = [
        Self::DnsttServer,
        Self::SlipstreamServer,
        Self::SsServer,
        Self::Microsocks,
    ];

    /// Executable name on disk, without platform suffix
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DnsttServer => "dnstt-server",
            Self::SlipstreamServer => "slipstream-server",
            Self::SsServer => "ssserver",
            Self::Microsocks => "microsocks",
        }
    }
}

impl fmt::Display for BinaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BinaryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::UnknownBinary {
                name: s.to_string(),
            })
    }
}

/// Compression wrapped around a tar archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    TarXz,
}

/// Where the binary lives inside a release archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub format: ArchiveFormat,
    /// Base file name of the binary inside the archive, without `.exe`
    pub entry_name: String,
}

/// Catalog entry for one binary
#[derive(Debug, Clone)]
pub struct BinaryDefinition {
    pub binary_type: BinaryType,

    /// Environment variable holding an absolute override path
    pub override_env: String,

    /// Download URL with `{os}`, `{arch}`, `{ext}`, `{version}` and family placeholders
    pub url_template: String,

    /// Set when the download is an archive rather than a bare executable
    pub archive: Option<ArchiveEntry>,

    /// Architecture naming used by the release assets
    pub naming: NamingFamily,

    /// Supported architectures per operating system
    pub platforms: BTreeMap<Os, BTreeSet<Arch>>,

    /// Target version; empty means never updated
    pub pinned_version: String,

    /// Exclude from update diffing regardless of pinned version
    pub skip_update: bool,
}

impl BinaryDefinition {
    /// Whether the release matrix covers this platform
    pub fn supports(&self, platform: &Platform) -> bool {
        self.platforms
            .get(&platform.os)
            .is_some_and(|arches| arches.contains(&platform.arch))
    }

    /// Whether a release asset exists for this platform
    ///
    /// Stricter than [`supports`](Self::supports): a family-specific
    /// placeholder in the URL template must also have a name for the
    /// platform, e.g. microsocks publishes no glibc build for arm.
    pub fn available_on(&self, platform: &Platform) -> bool {
        if !self.supports(platform) {
            return false;
        }
        match self.naming.placeholder() {
            Some(placeholder) if self.url_template.contains(placeholder) => {
                self.naming.arch_token(platform).is_some()
            }
            _ => true,
        }
    }

    /// Whether the update orchestrator manages this binary
    pub fn is_update_managed(&self) -> bool {
        !self.pinned_version.is_empty() && !self.skip_update
    }

    /// File name in the managed directory
    pub fn file_name(&self, platform: &Platform) -> String {
        format!("{}{}", self.binary_type, platform.exe_suffix())
    }

    /// Expected base name inside the archive, if archive-sourced
    pub fn archive_entry_name(&self, platform: &Platform) -> Option<String> {
        self.archive
            .as_ref()
            .map(|a| format!("{}{}", a.entry_name, platform.exe_suffix()))
    }

    /// Download URL for a version on a platform
    ///
    /// Platform support is checked before anything else so callers never
    /// reach the network for an unsupported binary.
    pub fn download_url(&self, platform: &Platform, version: &str) -> Result<String> {
        let unsupported = || Error::UnsupportedPlatform {
            binary: self.binary_type,
            os: platform.os.to_string(),
            arch: platform.arch.to_string(),
        };

        if !self.supports(platform) {
            return Err(unsupported());
        }

        if self.url_template.is_empty() {
            return Err(Error::NoDownloadUrl {
                binary: self.binary_type,
            });
        }

        expand_template(&self.url_template, platform, self.naming, version).ok_or_else(unsupported)
    }
}

/// Registry of binary definitions, unique by type
#[derive(Debug, Clone)]
pub struct Catalog {
    definitions: Vec<BinaryDefinition>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate types and nameless archive entries
    pub fn new(definitions: Vec<BinaryDefinition>) -> Result<Self> {
        let mut seen = HashSet::new();
        for def in &definitions {
            if !seen.insert(def.binary_type) {
                return Err(Error::DuplicateBinary {
                    binary: def.binary_type,
                });
            }
            if def
                .archive
                .as_ref()
                .is_some_and(|a| a.entry_name.trim().is_empty())
            {
                return Err(Error::MissingArchiveEntry {
                    binary: def.binary_type,
                });
            }
        }
        Ok(Self { definitions })
    }

    /// The catalog relayctl ships with
    pub fn builtin() -> Self {
        Self {
            definitions: builtin_definitions(),
        }
    }

    pub fn get(&self, binary: BinaryType) -> Result<&BinaryDefinition> {
        self.definitions
            .iter()
            .find(|d| d.binary_type == binary)
            .ok_or_else(|| Error::UnknownBinary {
                name: binary.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &BinaryDefinition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn matrix(entries: &[(Os, &[Arch])]) -> BTreeMap<Os, BTreeSet<Arch>> {
    entries
        .iter()
        .map(|(os, arches)| (*os, arches.iter().copied().collect()))
        .collect()
}

fn builtin_definitions() -> Vec<BinaryDefinition> {
    use Arch::*;

    vec![
        BinaryDefinition {
            binary_type: BinaryType::DnsttServer,
            override_env: "RELAYCTL_DNSTT_SERVER_PATH".to_string(),
            url_template: "https://github.com/relayctl/dnstt-build/releases/download/{version}/dnstt-server-{os}-{arch}{ext}".to_string(),
            archive: None,
            naming: NamingFamily::Generic,
            platforms: matrix(&[
                (Os::Linux, &[Amd64, Arm64, Arm, I386]),
                (Os::Darwin, &[Amd64, Arm64]),
                (Os::Windows, &[Amd64]),
            ]),
            pinned_version: "v2026.01.29".to_string(),
            skip_update: false,
        },
        BinaryDefinition {
            binary_type: BinaryType::SlipstreamServer,
            override_env: "RELAYCTL_SLIPSTREAM_SERVER_PATH".to_string(),
            url_template: "https://github.com/relayctl/slipstream-build/releases/download/{version}/slipstream-server-{os}-{arch}".to_string(),
            archive: None,
            naming: NamingFamily::Generic,
            platforms: matrix(&[(Os::Linux, &[Amd64, Arm64])]),
            pinned_version: "v2026.01.29".to_string(),
            skip_update: false,
        },
        BinaryDefinition {
            binary_type: BinaryType::SsServer,
            override_env: "RELAYCTL_SSSERVER_PATH".to_string(),
            url_template: "https://github.com/shadowsocks/shadowsocks-rust/releases/download/{version}/shadowsocks-{version}.{ssarch}.tar.xz".to_string(),
            archive: Some(ArchiveEntry {
                format: ArchiveFormat::TarXz,
                entry_name: "ssserver".to_string(),
            }),
            naming: NamingFamily::RustTriple,
            platforms: matrix(&[
                (Os::Linux, &[Amd64, Arm64, Arm, I386]),
                (Os::Darwin, &[Amd64, Arm64]),
            ]),
            pinned_version: "v1.23.5".to_string(),
            skip_update: false,
        },
        BinaryDefinition {
            binary_type: BinaryType::Microsocks,
            override_env: "RELAYCTL_MICROSOCKS_PATH".to_string(),
            url_template: "https://github.com/relayctl/microsocks-build/releases/download/{version}/microsocks-{microsocksarch}".to_string(),
            archive: None,
            naming: NamingFamily::LibcAware,
            platforms: matrix(&[(Os::Linux, &[Amd64, Arm64, Arm, I386])]),
            pinned_version: "v1.0.5".to_string(),
            skip_update: false,
        },
    ]
}
