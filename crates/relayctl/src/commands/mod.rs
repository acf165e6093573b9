//! CLI command implementations

pub mod binaries;
pub mod tunnel;
pub mod update;
pub mod upgrade;
pub mod version;
