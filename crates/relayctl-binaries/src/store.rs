//! Binary store
//!
//! Resolves a catalog binary to an executable on disk. Precedence is the
//! override environment variable, then the cached copy in the managed
//! directory, then a download of the pinned version.
//!
//! Every write is staged in a temporary file next to its destination and
//! renamed into place only once the payload is complete and executable, so
//! an interrupted download never leaves a truncated binary that looks
//! installed. Each call makes at most one network attempt.

use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::archive;
use crate::catalog::{BinaryDefinition, BinaryType, Catalog};
use crate::error::{Error, Result};
use crate::platform::Platform;

/// How a binary path was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOrigin {
    Override,
    Cached,
    Downloaded,
}

impl std::fmt::Display for PathOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Override => "override",
            Self::Cached => "cached",
            Self::Downloaded => "downloaded",
        };
        f.write_str(s)
    }
}

/// A binary located on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBinary {
    pub binary: BinaryType,
    pub path: PathBuf,
    pub origin: PathOrigin,
}

/// Read-only lookup of an already provisioned binary
///
/// Consumers that only need a path (the transport builder) depend on this
/// rather than on the full store, and never trigger a download.
pub trait BinaryLocator: Send + Sync {
    fn locate(&self, binary: BinaryType) -> Result<PathBuf>;
}

/// Override/cache/download resolution over one managed directory
pub struct BinaryStore {
    catalog: Catalog,
    bin_dir: PathBuf,
    platform: Platform,
    client: reqwest::Client,
    show_progress: bool,
}

impl BinaryStore {
    pub fn new(catalog: Catalog, bin_dir: impl Into<PathBuf>, platform: Platform) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(Error::Client)?;

        Ok(Self {
            catalog,
            bin_dir: bin_dir.into(),
            platform,
            client,
            show_progress: false,
        })
    }

    /// Use a preconfigured HTTP client (user agent, proxies)
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Enable or disable progress bars
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn bin_dir(&self) -> &Path {
        &self.bin_dir
    }

    /// Location of the managed copy, whether or not it exists
    pub fn cached_path(&self, binary: BinaryType) -> Result<PathBuf> {
        let def = self.catalog.get(binary)?;
        Ok(self.bin_dir.join(def.file_name(&self.platform)))
    }

    /// Override path from the environment, if the variable is set
    ///
    /// A variable pointing at a missing file is an error rather than a
    /// fall-through to the cached copy.
    pub fn override_path(&self, binary: BinaryType) -> Result<Option<PathBuf>> {
        let def = self.catalog.get(binary)?;
        let Some(value) = std::env::var_os(&def.override_env).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };

        let path = PathBuf::from(value);
        if !path.exists() {
            return Err(Error::OverrideMissing {
                binary,
                var: def.override_env.clone(),
                path,
            });
        }
        Ok(Some(path))
    }

    /// Whether the override variable for this binary is set at all
    pub fn is_overridden(&self, binary: BinaryType) -> bool {
        self.catalog
            .get(binary)
            .ok()
            .and_then(|def| std::env::var_os(&def.override_env))
            .is_some_and(|v| !v.is_empty())
    }

    /// Resolve without touching the network
    pub fn resolve_path(&self, binary: BinaryType) -> Result<ResolvedBinary> {
        if let Some(path) = self.override_path(binary)? {
            debug!("Using {} from override at {}", binary, path.display());
            return Ok(ResolvedBinary {
                binary,
                path,
                origin: PathOrigin::Override,
            });
        }

        let cached = self.cached_path(binary)?;
        if cached.is_file() {
            return Ok(ResolvedBinary {
                binary,
                path: cached,
                origin: PathOrigin::Cached,
            });
        }

        Err(Error::NotInstalled { binary })
    }

    /// Resolve, downloading the pinned version when nothing is on disk
    pub async fn ensure_installed(&self, binary: BinaryType) -> Result<ResolvedBinary> {
        match self.resolve_path(binary) {
            Err(Error::NotInstalled { .. }) => {}
            other => return other,
        }

        let def = self.catalog.get(binary)?;
        let dest = self.cached_path(binary)?;
        self.download(def, &def.pinned_version, &dest).await?;

        Ok(ResolvedBinary {
            binary,
            path: dest,
            origin: PathOrigin::Downloaded,
        })
    }

    /// Download a specific version into the managed directory
    pub async fn download_version(&self, binary: BinaryType, version: &str) -> Result<PathBuf> {
        let def = self.catalog.get(binary)?;
        let dest = self.cached_path(binary)?;
        self.download(def, version, &dest).await?;
        Ok(dest)
    }

    /// Fetch one release asset and install it at `dest`
    pub async fn download(&self, def: &BinaryDefinition, version: &str, dest: &Path) -> Result<()> {
        let binary = def.binary_type;
        let url = def.download_url(&self.platform, version)?;

        info!("Downloading {} {} from {}", binary, version, url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| Error::Http { binary, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                binary,
                status: status.as_u16(),
                url,
            });
        }

        let mut staged = self.stage(dest, binary)?;

        match (&def.archive, def.archive_entry_name(&self.platform)) {
            (Some(entry), Some(entry_name)) => {
                let mut payload = Vec::new();
                let received = self.receive(response, &mut payload, binary).await?;
                if received == 0 {
                    return Err(Error::EmptyPayload { binary, url });
                }

                let found =
                    archive::extract_entry(entry.format, &payload, &entry_name, staged.as_file_mut())
                        .map_err(|source| Error::Archive { binary, source })?;
                if !found {
                    return Err(Error::ArchiveEntryNotFound {
                        binary,
                        entry: entry_name,
                    });
                }
            }
            _ => {
                let received = self.receive(response, staged.as_file_mut(), binary).await?;
                if received == 0 {
                    return Err(Error::EmptyPayload { binary, url });
                }
            }
        }

        install_staged(staged, dest)?;
        info!("Installed {} {} at {}", binary, version, dest.display());
        Ok(())
    }

    /// Adopt an existing executable into the managed directory
    pub fn copy_to_dir(&self, src: &Path, binary: BinaryType) -> Result<PathBuf> {
        let dest = self.cached_path(binary)?;
        let mut source = File::open(src)?;
        let mut staged = self.stage(&dest, binary)?;

        io::copy(&mut source, staged.as_file_mut())?;
        install_staged(staged, &dest)?;

        info!("Adopted {} from {} into {}", binary, src.display(), dest.display());
        Ok(dest)
    }

    fn stage(&self, dest: &Path, binary: BinaryType) -> Result<NamedTempFile> {
        let parent = dest.parent().unwrap_or(&self.bin_dir);
        fs::create_dir_all(parent)?;

        let staged = tempfile::Builder::new()
            .prefix(&format!(".{}.", binary))
            .suffix(".partial")
            .tempfile_in(parent)?;
        Ok(staged)
    }

    async fn receive<W: Write>(
        &self,
        response: reqwest::Response,
        out: &mut W,
        binary: BinaryType,
    ) -> Result<u64> {
        let progress = self
            .show_progress
            .then(|| progress_bar(response.content_length(), binary));

        let mut received = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| Error::Http { binary, source })?;
            out.write_all(&chunk)?;
            received += chunk.len() as u64;

            if let Some(pb) = &progress {
                pb.set_position(received);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        debug!("Received {} bytes for {}", received, binary);
        Ok(received)
    }
}

impl BinaryLocator for BinaryStore {
    fn locate(&self, binary: BinaryType) -> Result<PathBuf> {
        self.resolve_path(binary).map(|resolved| resolved.path)
    }
}

fn progress_bar(total: Option<u64>, binary: BinaryType) -> ProgressBar {
    let pb = match total {
        Some(len) => ProgressBar::new(len),
        None => ProgressBar::new_spinner(),
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    pb.set_message(format!("Downloading {}", binary));
    pb
}

fn install_staged(staged: NamedTempFile, dest: &Path) -> Result<()> {
    staged.as_file().sync_all()?;
    set_executable(staged.path())?;
    staged.persist(dest).map_err(io::Error::from)?;
    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}
