//! Dependency-aware updates for relayctl
//!
//! Provides:
//! - The service dependency index (which live tunnels use a binary)
//! - The update orchestrator (diff, drain, replace, commit, restart)
//! - An advisory lock serialising update runs on one host
//! - Release metadata lookup and self-update of the relayctl executable

pub mod dependents;
pub mod lock;
pub mod orchestrator;
pub mod releases;
pub mod self_update;

pub use dependents::{DependencyIndex, DependentScan};
pub use lock::UpdateLock;
pub use orchestrator::{
    PendingUpdate, ServiceFailure, SkipReason, SkippedUpdate, UpdateFailure, UpdateOrchestrator,
    UpdatePlan, UpdateReport, UpdatedBinary,
};
pub use releases::{platform_asset, Release, ReleaseAsset, ReleaseChecker};
pub use self_update::SelfUpdater;

/// Current CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
