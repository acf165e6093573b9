//! Shared test infrastructure for relayctl-binaries integration tests
//!
//! - `constants`: platforms, payloads, override variable names
//! - `fixtures`: test catalogs pointed at a mock server, archive builders
//! - `mock_server`: wiremock endpoints for release assets

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod constants;
pub mod fixtures;
pub mod mock_server;

pub use constants::*;
pub use fixtures::*;
pub use mock_server::*;
