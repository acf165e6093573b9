//! Shared test infrastructure for relayctl-transport integration tests
//!
//! - `fakes`: binary locator, counting material providers, service manager
//! - `fixtures`: tunnel and backend builders

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fakes;
pub mod fixtures;

pub use fakes::*;
pub use fixtures::*;
