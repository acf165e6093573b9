//! Transport command builder for relayctl
//!
//! Turns a tunnel and its backend, plus certificate or key material and the
//! resolved binary paths, into a `ServiceDescriptor` for the service
//! manager. The Shadowsocks-with-plugin path also writes a generated server
//! config into the tunnel's config directory.

pub mod builder;
pub mod error;
pub mod material;
pub mod ownership;

pub use builder::{BindOptions, TransportBuilder, DEFAULT_DNSTT_MTU, DEFAULT_SS_METHOD};
pub use error::{Error, Result};
pub use material::{
    CertificateInfo, CertificateProvider, FileMaterialStore, KeyPairInfo, KeyProvider,
};
