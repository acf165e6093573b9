//! Best-effort ownership handoff to the service account
//!
//! Runs right after material is prepared, possibly before the service
//! account exists. Failure is reported on the diagnostics channel and never
//! fails the build.

use relayctl_core::{Diagnostic, Diagnostics};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// `chown -R owner:owner path`, reporting failure instead of returning it
pub fn chown_best_effort(path: &Path, owner: &str, diagnostics: &Diagnostics) -> bool {
    let owner_group = format!("{0}:{0}", owner);
    let result = Command::new("chown").arg("-R").arg(&owner_group).arg(path).output();

    let reason = match result {
        Ok(output) if output.status.success() => {
            debug!("Changed owner of {} to {}", path.display(), owner);
            return true;
        }
        Ok(output) => String::from_utf8_lossy(&output.stderr).trim().to_string(),
        Err(e) => e.to_string(),
    };

    diagnostics.report(Diagnostic::OwnershipChangeFailed {
        path: path.to_path_buf(),
        owner: owner.to_string(),
        reason,
    });
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unknown_owner_is_reported_not_raised() {
        let dir = TempDir::new().unwrap();
        let diagnostics = Diagnostics::new();

        let changed = chown_best_effort(dir.path(), "relayctl-no-such-account", &diagnostics);

        assert!(!changed);
        match diagnostics.entries().as_slice() {
            [Diagnostic::OwnershipChangeFailed { path, owner, .. }] => {
                assert_eq!(path, dir.path());
                assert_eq!(owner, "relayctl-no-such-account");
            }
            other => panic!("unexpected diagnostics: {:?}", other),
        }
    }
}
