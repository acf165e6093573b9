//! Shared test infrastructure for relayctl-update integration tests
//!
//! - `services`: recording `ServiceManager` fake
//! - `fixtures`: catalogs, tunnel configs and manifests for update scenarios

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fixtures;
pub mod services;

pub use fixtures::*;
pub use services::*;
