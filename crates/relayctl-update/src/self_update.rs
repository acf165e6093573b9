//! Self-update of the relayctl executable
//!
//! The new build is downloaded to a temporary file, made executable, and
//! moved over the running executable. The running process keeps its old
//! image; the next invocation runs the new one.

use anyhow::{anyhow, Context, Result};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, info, warn};

use crate::releases::ReleaseAsset;

/// Replaces the running relayctl binary with a downloaded release asset
pub struct SelfUpdater {
    client: reqwest::Client,
    binary_path: PathBuf,
    show_progress: bool,
}

impl SelfUpdater {
    /// Target the running executable, or `fallback` if it cannot be resolved
    pub fn new(user_agent: &str, fallback: &Path) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            binary_path: current_binary_path(fallback),
            show_progress: false,
        })
    }

    /// Replace a specific file instead of the running executable
    pub fn with_binary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary_path = path.into();
        self
    }

    /// Enable or disable progress bars
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Download `asset` and install it over the current binary
    pub async fn apply(&self, asset: &ReleaseAsset) -> Result<PathBuf> {
        info!("Downloading {}", asset.name);
        let staged = self.download(asset).await?;

        set_executable(&staged).context("Failed to make new binary executable")?;
        self.replace_binary(staged)?;

        info!("Installed {} at {}", asset.name, self.binary_path.display());
        Ok(self.binary_path.clone())
    }

    async fn download(&self, asset: &ReleaseAsset) -> Result<TempPath> {
        let response = self
            .client
            .get(&asset.browser_download_url)
            .send()
            .await
            .context("Failed to send download request")?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "Download failed with status: {}",
                response.status()
            ));
        }

        let progress = self.show_progress.then(|| {
            let pb = ProgressBar::new(response.content_length().unwrap_or(asset.size));
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
                    .expect("Invalid progress bar template")
                    .progress_chars("#>-"),
            );
            pb.set_message(format!("Downloading {}", asset.name));
            pb
        });

        let mut file = tempfile::Builder::new()
            .prefix("relayctl-upgrade-")
            .tempfile()
            .context("Failed to create temporary file")?;

        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Failed to read download chunk")?;
            file.write_all(&chunk)
                .context("Failed to write to temporary file")?;
            downloaded += chunk.len() as u64;

            if let Some(pb) = &progress {
                pb.set_position(downloaded);
            }
        }

        if let Some(pb) = progress {
            pb.finish_with_message(format!("Downloaded {}", asset.name));
        }

        if downloaded == 0 {
            return Err(anyhow!("Downloaded {} is empty", asset.name));
        }

        file.as_file().sync_all()?;
        Ok(file.into_temp_path())
    }

    /// Unlink the old file, then rename; copy when crossing filesystems
    fn replace_binary(&self, staged: TempPath) -> Result<()> {
        debug!(
            "Replacing binary: {:?} -> {:?}",
            staged, self.binary_path
        );

        if let Some(parent) = self.binary_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        if self.binary_path.exists() {
            fs::remove_file(&self.binary_path).with_context(|| {
                format!("Failed to remove old binary {}", self.binary_path.display())
            })?;
        }

        if let Err(e) = fs::rename(&staged, &self.binary_path) {
            warn!("Rename failed ({}), copying new binary into place", e);
            fs::copy(&staged, &self.binary_path).context("Failed to copy new binary")?;
            set_executable(&self.binary_path).context("Failed to make binary executable")?;
        }

        Ok(())
    }
}

/// Symlink-resolved path of the running executable
fn current_binary_path(fallback: &Path) -> PathBuf {
    std::env::current_exe()
        .and_then(fs::canonicalize)
        .unwrap_or_else(|e| {
            debug!(
                "Cannot resolve running executable ({}), using {}",
                e,
                fallback.display()
            );
            fallback.to_path_buf()
        })
}

#[cfg(unix)]
fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
