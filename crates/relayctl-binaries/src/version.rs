//! Version comparison across release naming schemes
//!
//! Binaries are released either with date versions (`v2026.01.29`) or with
//! semver-like versions (`v1.23.5`). The comparator orders both, plus empty
//! and development placeholders, in one total order.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

/// Strings that mean "not a real release"
const DEV_SENTINELS: &[&str] = &["dev", "unknown", "latest"];

static DATE_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}\.\d{2}\.\d{2}$").expect("date version regex is valid"));

/// Whether a version (leading `v` already stripped or not) is a placeholder
pub fn is_dev_like(version: &str) -> bool {
    let version = version.strip_prefix('v').unwrap_or(version);
    DEV_SENTINELS.contains(&version) || !version.chars().any(|c| c.is_ascii_digit())
}

/// Total order over installed/pinned version strings
///
/// Empty sorts first, then dev-like placeholders, then real releases.
/// Two `YYYY.MM.DD` versions compare as fixed-width strings; anything else
/// compares numeric components with missing trailing components as zero.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a = a.strip_prefix('v').unwrap_or(a);
    let b = b.strip_prefix('v').unwrap_or(b);

    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    match (is_dev_like(a), is_dev_like(b)) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    if DATE_VERSION_RE.is_match(a) && DATE_VERSION_RE.is_match(b) {
        return a.cmp(b);
    }

    let left = numeric_components(a);
    let right = numeric_components(b);
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    Ordering::Equal
}

/// Whether `candidate` is strictly newer than `current`
pub fn is_newer(current: &str, candidate: &str) -> bool {
    compare_versions(current, candidate) == Ordering::Less
}

fn numeric_components(version: &str) -> Vec<u64> {
    version
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse::<u64>().ok())
        .collect()
}
