//! Platform resolution
//!
//! Maps the host's (os, arch) and, on Linux, its C library to the naming
//! strings each binary family uses in its release assets. Only the libc probe
//! touches the filesystem.

use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

/// Marker file present on Alpine (musl) systems
const ALPINE_MARKER: &str = "etc/alpine-release";

/// Loader and library paths that indicate a glibc userland
const GLIBC_MARKERS: &[&str] = &[
    "lib64/ld-linux-x86-64.so.2",
    "lib/ld-linux-aarch64.so.1",
    "lib/ld-linux-armhf.so.3",
    "lib/ld-linux.so.2",
    "lib/x86_64-linux-gnu/libc.so.6",
    "lib/aarch64-linux-gnu/libc.so.6",
    "usr/lib/libc.so.6",
    "usr/lib64/libc.so.6",
];

/// Operating system, named as release assets name it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Os {
    Linux,
    Darwin,
    Windows,
}

impl Os {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "windows",
        }
    }

    /// Map a Rust `std::env::consts::OS` value
    pub fn from_rust(os: &str) -> Option<Self> {
        match os {
            "linux" => Some(Self::Linux),
            "macos" => Some(Self::Darwin),
            "windows" => Some(Self::Windows),
            _ => None,
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture, named as release assets name it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Arch {
    Amd64,
    Arm64,
    Arm,
    I386,
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amd64 => "amd64",
            Self::Arm64 => "arm64",
            Self::Arm => "arm",
            Self::I386 => "386",
        }
    }

    /// Map a Rust `std::env::consts::ARCH` value
    pub fn from_rust(arch: &str) -> Option<Self> {
        match arch {
            "x86_64" => Some(Self::Amd64),
            "aarch64" => Some(Self::Arm64),
            "arm" => Some(Self::Arm),
            "x86" => Some(Self::I386),
            _ => None,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// C library flavour of a Linux host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Libc {
    Glibc,
    Musl,
}

/// Resolved host platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: Os,
    pub arch: Arch,
    /// Only meaningful on Linux
    pub libc: Libc,
}

impl Platform {
    pub fn new(os: Os, arch: Arch, libc: Libc) -> Self {
        Self { os, arch, libc }
    }

    /// Detect the running host, probing libc on Linux
    pub fn detect() -> Result<Self> {
        let unsupported = || Error::UnsupportedHost {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        };

        let os = Os::from_rust(std::env::consts::OS).ok_or_else(unsupported)?;
        let arch = Arch::from_rust(std::env::consts::ARCH).ok_or_else(unsupported)?;
        let libc = if os == Os::Linux {
            detect_libc()
        } else {
            Libc::Glibc
        };

        Ok(Self { os, arch, libc })
    }

    /// Executable suffix substituted for `{ext}`
    pub fn exe_suffix(&self) -> &'static str {
        if self.os == Os::Windows {
            ".exe"
        } else {
            ""
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.os, self.libc) {
            (Os::Linux, Libc::Musl) => write!(f, "{}/{} (musl)", self.os, self.arch),
            _ => write!(f, "{}/{}", self.os, self.arch),
        }
    }
}

/// Probe the host root filesystem for its C library
pub fn detect_libc() -> Libc {
    detect_libc_in(Path::new("/"))
}

/// Probe a root filesystem for its C library
///
/// Alpine's marker wins; known glibc loaders confirm glibc; anything else is
/// assumed to be glibc.
pub fn detect_libc_in(root: &Path) -> Libc {
    if root.join(ALPINE_MARKER).exists() {
        return Libc::Musl;
    }

    if GLIBC_MARKERS.iter().any(|marker| root.join(marker).exists()) {
        return Libc::Glibc;
    }

    Libc::Glibc
}

/// How a binary family names architectures in its release assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamingFamily {
    /// Plain `{os}` / `{arch}` substitution
    Generic,
    /// Rust target triple substituted for `{ssarch}`
    RustTriple,
    /// libc-aware name substituted for `{microsocksarch}`
    LibcAware,
}

impl NamingFamily {
    /// Family-specific placeholder, if any
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::Generic => None,
            Self::RustTriple => Some("{ssarch}"),
            Self::LibcAware => Some("{microsocksarch}"),
        }
    }

    /// Family-specific architecture token; `None` when the family publishes
    /// nothing for this platform
    pub fn arch_token(&self, platform: &Platform) -> Option<String> {
        match self {
            Self::Generic => Some(platform.arch.as_str().to_string()),
            Self::RustTriple => Some(rust_triple(platform)),
            Self::LibcAware => libc_arch(platform).map(String::from),
        }
    }
}

fn rust_triple(platform: &Platform) -> String {
    let triple = match (platform.os, platform.arch) {
        (Os::Linux, Arch::Amd64) => "x86_64-unknown-linux-musl",
        (Os::Linux, Arch::Arm64) => "aarch64-unknown-linux-musl",
        (Os::Linux, Arch::Arm) => "arm-unknown-linux-musleabihf",
        (Os::Linux, Arch::I386) => "i686-unknown-linux-musl",
        (Os::Darwin, Arch::Amd64) => "x86_64-apple-darwin",
        (Os::Darwin, Arch::Arm64) => "aarch64-apple-darwin",
        (Os::Windows, Arch::Amd64) => "x86_64-pc-windows-msvc",
        (os, arch) => return format!("{}-unknown-{}", arch, os),
    };
    triple.to_string()
}

fn libc_arch(platform: &Platform) -> Option<&'static str> {
    if platform.os != Os::Linux {
        return None;
    }

    match (platform.libc, platform.arch) {
        (Libc::Glibc, Arch::Amd64) => Some("x86_64-linux-gnu"),
        (Libc::Glibc, Arch::Arm64) => Some("aarch64-linux-gnu"),
        (Libc::Musl, Arch::Amd64) => Some("x86_64-linux-musl"),
        (Libc::Musl, Arch::Arm64) => Some("aarch64-linux-musl"),
        (Libc::Musl, Arch::Arm) => Some("arm-linux-musleabihf"),
        (Libc::Musl, Arch::I386) => Some("i686-linux-musl"),
        (Libc::Glibc, Arch::Arm | Arch::I386) => None,
    }
}

/// Expand a URL template for a platform and version
///
/// Returns `None` when the family has no asset for the platform.
pub fn expand_template(
    template: &str,
    platform: &Platform,
    family: NamingFamily,
    version: &str,
) -> Option<String> {
    let mut url = template
        .replace("{os}", platform.os.as_str())
        .replace("{arch}", platform.arch.as_str())
        .replace("{ext}", platform.exe_suffix())
        .replace("{version}", version);

    if let Some(placeholder) = family.placeholder() {
        if url.contains(placeholder) {
            let token = family.arch_token(platform)?;
            url = url.replace(placeholder, &token);
        }
    }

    Some(url)
}
