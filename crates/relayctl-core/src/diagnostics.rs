//! Diagnostics channel for best-effort outcomes
//!
//! Some failures are expected and must not fail the surrounding operation,
//! e.g. changing ownership of freshly created key material before the service
//! account exists. They are logged and retained here so callers can report
//! them.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// A non-fatal outcome worth surfacing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Ownership of generated material could not be handed to the service account
    OwnershipChangeFailed {
        path: PathBuf,
        owner: String,
        reason: String,
    },

    /// Tunnel configuration could not be read while looking for dependents
    DependencyScanFailed { binary: String, reason: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OwnershipChangeFailed {
                path,
                owner,
                reason,
            } => write!(
                f,
                "could not change owner of {} to {}: {}",
                path.display(),
                owner,
                reason
            ),
            Self::DependencyScanFailed { binary, reason } => write!(
                f,
                "dependents of {} unknown, tunnel config unreadable: {}",
                binary, reason
            ),
        }
    }
}

/// Cloneable sink shared by everything taking part in one invocation
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Arc<Mutex<Vec<Diagnostic>>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log and retain a diagnostic
    pub fn report(&self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(diagnostic);
        }
    }

    /// Snapshot of everything reported so far
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries
            .lock()
            .map(|entries| entries.is_empty())
            .unwrap_or(true)
    }
}
