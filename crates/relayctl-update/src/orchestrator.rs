//! Update orchestrator
//!
//! A batch runs in five phases:
//! 1. Diff installed against pinned versions, recording dependents up front
//! 2. Drain: stop the union of dependent services, each exactly once
//! 3. Replace: download each pending binary; failures skip only that binary
//! 4. Commit: persist the manifest once with the binaries that succeeded;
//!    a write failure is recorded on the report, not returned
//! 5. Restart: start every service stopped in phase 2
//!
//! There is no cross-binary transaction. A binary that failed keeps its old
//! manifest entry, so the next run retries it.

use anyhow::{Context, Result};
use relayctl_binaries::{is_newer, BinaryStore, BinaryType, VersionManifest};
use relayctl_core::ServiceManager;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::dependents::DependencyIndex;
use crate::lock::UpdateLock;

/// Why a catalog entry was left out of the diff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty pinned version or skip-update set in the catalog
    NotManaged,
    /// The override environment variable is set
    Overridden,
    /// No release is published for this platform
    Unsupported,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotManaged => write!(f, "not managed"),
            Self::Overridden => write!(f, "overridden"),
            Self::Unsupported => write!(f, "unsupported platform"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedUpdate {
    pub binary: BinaryType,
    pub reason: SkipReason,
}

/// A binary whose installed version is older than its pin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    pub binary: BinaryType,
    pub installed: Option<String>,
    pub target: String,
    /// Active services using the binary, computed before anything is touched
    pub dependents: Vec<String>,
    /// Dependents could not be determined
    pub dependents_unknown: bool,
}

/// Outcome of the diff phase
#[derive(Debug, Clone, Default)]
pub struct UpdatePlan {
    pub pending: Vec<PendingUpdate>,
    pub skipped: Vec<SkippedUpdate>,
    pub up_to_date: Vec<BinaryType>,
    /// Entries that cannot be evaluated, e.g. an override pointing nowhere
    pub invalid: Vec<UpdateFailure>,
}

impl UpdatePlan {
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Union of dependents across pending updates, sorted and unique
    pub fn services_to_drain(&self) -> BTreeSet<String> {
        self.pending
            .iter()
            .flat_map(|p| p.dependents.iter().cloned())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedBinary {
    pub binary: BinaryType,
    pub from: Option<String>,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateFailure {
    pub binary: BinaryType,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFailure {
    pub service: String,
    pub error: String,
}

/// Per-binary and per-service outcome of a batch
#[derive(Debug, Clone, Default)]
pub struct UpdateReport {
    pub updated: Vec<UpdatedBinary>,
    pub failed: Vec<UpdateFailure>,
    pub skipped: Vec<SkippedUpdate>,
    pub up_to_date: Vec<BinaryType>,
    /// Binaries replaced while their dependents were unknown
    pub dependents_unknown: Vec<BinaryType>,
    pub stopped: Vec<String>,
    pub stop_failures: Vec<ServiceFailure>,
    pub restart_failures: Vec<ServiceFailure>,
    /// Set when the manifest could not be written; replaced binaries are
    /// still on disk but will be offered again by the next run
    pub commit_error: Option<String>,
}

impl UpdateReport {
    /// Whether every attempted replacement and restart succeeded
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.restart_failures.is_empty() && self.commit_error.is_none()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} updated, {} skipped, {} failed, {} up to date",
            self.updated.len(),
            self.skipped.len(),
            self.failed.len(),
            self.up_to_date.len()
        )
    }
}

/// Coordinates binary replacement with the services that use the binaries
pub struct UpdateOrchestrator {
    store: Arc<BinaryStore>,
    services: Arc<dyn ServiceManager>,
    dependents: DependencyIndex,
    manifest_path: PathBuf,
}

impl UpdateOrchestrator {
    pub fn new(
        store: Arc<BinaryStore>,
        services: Arc<dyn ServiceManager>,
        dependents: DependencyIndex,
        manifest_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            services,
            dependents,
            manifest_path: manifest_path.into(),
        }
    }

    /// Compute the pending plan without changing anything
    pub async fn plan(&self) -> Result<UpdatePlan> {
        let manifest = self.load_manifest()?;
        Ok(self.diff(&manifest).await)
    }

    /// Run a full batch under the update lock
    pub async fn run(&self) -> Result<UpdateReport> {
        let _lock = UpdateLock::acquire(&self.manifest_path)?;

        let mut manifest = self.load_manifest()?;
        let plan = self.diff(&manifest).await;

        let mut report = UpdateReport {
            failed: plan.invalid.clone(),
            skipped: plan.skipped.clone(),
            up_to_date: plan.up_to_date.clone(),
            dependents_unknown: plan
                .pending
                .iter()
                .filter(|p| p.dependents_unknown)
                .map(|p| p.binary)
                .collect(),
            ..Default::default()
        };

        if plan.is_empty() {
            info!("All managed binaries are up to date");
            return Ok(report);
        }

        self.drain(&plan, &mut report).await;
        self.replace(&plan, &mut manifest, &mut report).await;

        if !report.updated.is_empty() {
            if let Err(e) = manifest.save(&self.manifest_path) {
                error!(
                    "Failed to write version manifest {}: {}",
                    self.manifest_path.display(),
                    e
                );
                report.commit_error = Some(e.to_string());
            }
        }

        self.restart(&mut report).await;

        info!("Update finished: {}", report.summary());
        Ok(report)
    }

    fn load_manifest(&self) -> Result<VersionManifest> {
        VersionManifest::load(&self.manifest_path).with_context(|| {
            format!(
                "Failed to read version manifest {}",
                self.manifest_path.display()
            )
        })
    }

    async fn diff(&self, manifest: &VersionManifest) -> UpdatePlan {
        let mut plan = UpdatePlan::default();
        let platform = self.store.platform();

        for def in self.store.catalog().iter() {
            let binary = def.binary_type;

            let skip = if !def.is_update_managed() {
                Some(SkipReason::NotManaged)
            } else {
                match self.store.override_path(binary) {
                    Ok(Some(_)) => Some(SkipReason::Overridden),
                    Ok(None) if !def.available_on(platform) => Some(SkipReason::Unsupported),
                    Ok(None) => None,
                    Err(e) => {
                        warn!("Cannot evaluate {}: {}", binary, e);
                        plan.invalid.push(UpdateFailure {
                            binary,
                            error: e.to_string(),
                        });
                        continue;
                    }
                }
            };

            if let Some(reason) = skip {
                debug!("Skipping {}: {}", binary, reason);
                plan.skipped.push(SkippedUpdate { binary, reason });
                continue;
            }

            let installed = manifest.get(binary);
            if !is_newer(installed.unwrap_or(""), &def.pinned_version) {
                plan.up_to_date.push(binary);
                continue;
            }

            let scan = self.dependents.services_depending_on(binary).await;
            info!(
                "{} {} -> {} pending ({} dependent services)",
                binary,
                installed.unwrap_or("none"),
                def.pinned_version,
                scan.services.len()
            );

            plan.pending.push(PendingUpdate {
                binary,
                installed: installed.map(String::from),
                target: def.pinned_version.clone(),
                dependents: scan.services,
                dependents_unknown: scan.unknown,
            });
        }

        plan
    }

    async fn drain(&self, plan: &UpdatePlan, report: &mut UpdateReport) {
        for service in plan.services_to_drain() {
            info!("Stopping {}", service);
            match self.services.stop_service(&service).await {
                Ok(()) => report.stopped.push(service),
                Err(e) => {
                    warn!("Failed to stop {}: {}", service, e);
                    report.stop_failures.push(ServiceFailure {
                        service,
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    async fn replace(
        &self,
        plan: &UpdatePlan,
        manifest: &mut VersionManifest,
        report: &mut UpdateReport,
    ) {
        for pending in &plan.pending {
            match self
                .store
                .download_version(pending.binary, &pending.target)
                .await
            {
                Ok(path) => {
                    info!(
                        "Updated {} to {} at {}",
                        pending.binary,
                        pending.target,
                        path.display()
                    );
                    manifest.set(pending.binary, pending.target.clone());
                    report.updated.push(UpdatedBinary {
                        binary: pending.binary,
                        from: pending.installed.clone(),
                        to: pending.target.clone(),
                    });
                }
                Err(e) => {
                    error!("Failed to update {}: {}", pending.binary, e);
                    report.failed.push(UpdateFailure {
                        binary: pending.binary,
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    async fn restart(&self, report: &mut UpdateReport) {
        for service in &report.stopped {
            info!("Starting {}", service);
            if let Err(e) = self.services.start_service(service).await {
                error!("Failed to restart {}: {}", service, e);
                report.restart_failures.push(ServiceFailure {
                    service: service.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
}
