//! Transport binary provisioning for relayctl
//!
//! Provides:
//! - Platform resolution with per-family architecture naming
//! - The catalog of externally built transport binaries
//! - A store that resolves binaries via override, cache, or download
//! - Archive extraction for binaries shipped inside tarballs
//! - The installed-version manifest and its hybrid semver/date comparator

pub mod archive;
pub mod catalog;
pub mod error;
pub mod manifest;
pub mod platform;
pub mod store;
pub mod version;

pub use catalog::{ArchiveEntry, ArchiveFormat, BinaryDefinition, BinaryType, Catalog};
pub use error::{Error, Result};
pub use manifest::VersionManifest;
pub use platform::{Arch, Libc, NamingFamily, Os, Platform};
pub use store::{BinaryLocator, BinaryStore, PathOrigin, ResolvedBinary};
pub use version::{compare_versions, is_dev_like, is_newer};
