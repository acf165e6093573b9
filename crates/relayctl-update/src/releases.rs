//! GitHub release metadata for relayctl itself

use anyhow::{anyhow, Context, Result};
use relayctl_binaries::Platform;
use relayctl_core::types::GitHubConfig;
use relayctl_core::RuntimeConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use semver::Version;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Release metadata is advisory; never let it hang a status check
const RELEASE_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Release information
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Release tag (e.g., "v0.4.0")
    pub tag_name: String,

    pub name: Option<String>,

    #[serde(default)]
    pub prerelease: bool,

    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,

    pub published_at: Option<String>,
}

impl Release {
    /// Tag without the leading `v`
    pub fn version(&self) -> &str {
        self.tag_name.strip_prefix('v').unwrap_or(&self.tag_name)
    }
}

/// Release asset
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
}

/// Queries the release API for newer relayctl builds
pub struct ReleaseChecker {
    client: reqwest::Client,
    github: GitHubConfig,
}

impl ReleaseChecker {
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        let client = reqwest::Client::builder()
            .user_agent(&config.network.user_agent)
            .default_headers(headers)
            .timeout(RELEASE_FETCH_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            github: config.github.clone(),
        })
    }

    /// Get latest release
    pub async fn get_latest(&self) -> Result<Release> {
        let url = format!(
            "{}/repos/{}/{}/releases/latest",
            self.github.api_url.trim_end_matches('/'),
            self.github.repo_owner,
            self.github.repo_name
        );

        debug!("Fetching latest release from: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to reach release API")?;

        if !response.status().is_success() {
            return Err(anyhow!("Failed to fetch release: {}", response.status()));
        }

        let release: Release = response
            .json()
            .await
            .context("Failed to parse release metadata")?;
        Ok(release)
    }

    /// Latest release if it is newer than `current_version`
    pub async fn check_update(&self, current_version: &str) -> Result<Option<Release>> {
        let current = Version::parse(current_version.trim_start_matches('v'))
            .with_context(|| format!("Invalid current version {}", current_version))?;
        let latest = self.get_latest().await?;
        let latest_version = Version::parse(latest.version())
            .with_context(|| format!("Invalid release tag {}", latest.tag_name))?;

        if latest_version > current {
            info!("Update available: {} -> {}", current, latest_version);
            Ok(Some(latest))
        } else {
            debug!("Already on latest version: {}", current);
            Ok(None)
        }
    }
}

/// Asset built for `platform`, named `relayctl-<os>-<arch>[.exe]`
pub fn platform_asset<'a>(release: &'a Release, platform: &Platform) -> Option<&'a ReleaseAsset> {
    let expected = format!(
        "relayctl-{}-{}{}",
        platform.os,
        platform.arch,
        platform.exe_suffix()
    );
    release.assets.iter().find(|a| a.name == expected)
}
