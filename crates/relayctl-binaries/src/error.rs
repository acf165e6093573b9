//! Error types for relayctl-binaries

use std::path::PathBuf;
use thiserror::Error;

use crate::catalog::BinaryType;

/// Result type alias using relayctl-binaries's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Binary provisioning error types
#[derive(Error, Debug)]
pub enum Error {
    /// Name does not match any catalog entry
    #[error("Unknown binary type: {name}. Known types: dnstt-server, slipstream-server, ssserver, microsocks")]
    UnknownBinary { name: String },

    /// Catalog constructed with the same type twice
    #[error("Binary type {binary} is defined more than once in the catalog")]
    DuplicateBinary { binary: BinaryType },

    /// Archive-sourced definition without an in-archive file name
    #[error("Archive definition for {binary} does not name the file to extract")]
    MissingArchiveEntry { binary: BinaryType },

    /// The host itself is not a platform relayctl knows how to name
    #[error("Unsupported host platform: {os}/{arch}")]
    UnsupportedHost { os: String, arch: String },

    /// The binary is not published for this platform
    #[error("{binary} is not available for {os}/{arch}")]
    UnsupportedPlatform {
        binary: BinaryType,
        os: String,
        arch: String,
    },

    /// No download URL is defined for the binary
    #[error("No download URL defined for {binary}")]
    NoDownloadUrl { binary: BinaryType },

    /// Override variable points at a file that does not exist
    #[error("{var} is set to {path} for {binary}, but that file does not exist")]
    OverrideMissing {
        binary: BinaryType,
        var: String,
        path: PathBuf,
    },

    /// Neither an override nor a cached copy exists
    #[error("{binary} is not installed")]
    NotInstalled { binary: BinaryType },

    /// Request could not be sent or the body could not be read
    #[error("Failed to download {binary}: {source}")]
    Http {
        binary: BinaryType,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-2xx status
    #[error("Failed to download {binary}: HTTP {status} from {url}")]
    HttpStatus {
        binary: BinaryType,
        status: u16,
        url: String,
    },

    /// Server answered 2xx with no body
    #[error("Failed to download {binary}: empty response from {url}")]
    EmptyPayload { binary: BinaryType, url: String },

    /// Archive scanned completely without finding the binary
    #[error("Archive for {binary} does not contain a file named {entry}")]
    ArchiveEntryNotFound { binary: BinaryType, entry: String },

    /// Archive could not be decompressed or read
    #[error("Failed to extract {binary}: {source}")]
    Archive {
        binary: BinaryType,
        #[source]
        source: std::io::Error,
    },

    /// Version manifest exists but is not valid JSON
    #[error("Version manifest {path} is malformed: {source}")]
    ManifestMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// HTTP client could not be constructed
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
