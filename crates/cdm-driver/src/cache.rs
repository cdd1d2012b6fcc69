//! Local driver cache
//!
//! Layout under the cache root:
//!
//! ```text
//! <root>/
//! ├── .locks/
//! │   └── linux114.0.5735.90.lock
//! ├── linux89.0.4389.23/
//! │   └── chromedriver
//! └── linux114.0.5735.90/
//!     └── chromedriver
//! ```
//!
//! Lookups match on the short version (`major.minor`), so a request for
//! `114.0.5735.16` is served by a cached `linux114.0.5735.90`.

use crate::archive;
use crate::error::{DriverError, Result};
use crate::http::{self, ProgressFn};
use crate::index::{IndexClient, Mirror};
use crate::platform::HostPlatform;
use crate::resolver::{ArtifactMetadata, resolve};
use crate::version::DriverVersion;
use cdm_core::lock::acquire_stage_lock;
use reqwest::blocking::Client;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Default wait for another process staging the same version
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(300);

/// Milestones of the download-and-stage flow
#[derive(Debug)]
pub enum StageEvent<'a> {
    /// About to fetch `url` into `archive`
    Downloading { url: &'a Url, archive: &'a Path },
    /// Driver consolidated into `dir`
    Staged { dir: &'a Path },
}

/// Callback for [`StageEvent`]s
pub type ReportFn = fn(&StageEvent<'_>);

/// A versioned subdirectory of the cache root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Directory name as found on disk (`linux114.0.5735.90`)
    pub dir_name: String,
    pub version: DriverVersion,
    /// Where the driver binary is expected, whether or not it exists
    pub driver_path: PathBuf,
}

impl CacheEntry {
    pub fn is_present(&self) -> bool {
        self.driver_path.is_file()
    }
}

/// Driver cache for one platform
#[derive(Debug)]
pub struct DriverCache {
    root: PathBuf,
    platform: HostPlatform,
    index: IndexClient,
    progress: Option<ProgressFn>,
    report: Option<ReportFn>,
    lock_timeout: Duration,
}

impl DriverCache {
    pub fn new(
        root: impl Into<PathBuf>,
        platform: HostPlatform,
        mirror: Mirror,
        client: Client,
    ) -> Self {
        Self {
            root: root.into(),
            platform,
            index: IndexClient::new(client, mirror),
            progress: None,
            report: None,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Reports download progress as `(bytes_downloaded, total_bytes)`
    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Reports staging milestones
    pub fn with_report(mut self, report: ReportFn) -> Self {
        self.report = Some(report);
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cache entries for this platform, sorted by directory name
    ///
    /// Hidden directories, plain files and directories whose names do not
    /// parse as a version (after the platform prefix) are skipped. A missing
    /// root yields no entries.
    pub fn entries(&self) -> Result<Vec<CacheEntry>> {
        let names = self.platform.names();

        let read_dir = match fs::read_dir(&self.root) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(DriverError::io(
                    format!("read cache directory {}", self.root.display()),
                    e,
                ));
            }
        };

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| {
                DriverError::io(format!("read cache directory {}", self.root.display()), e)
            })?;

            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            let Ok(dir_name) = entry.file_name().into_string() else {
                continue;
            };
            if !is_dir || dir_name.starts_with('.') {
                continue;
            }

            let Some(version) = dir_name
                .strip_prefix(names.dir_prefix)
                .and_then(|raw| DriverVersion::parse(raw).ok())
            else {
                tracing::debug!("ignoring cache directory '{}'", dir_name);
                continue;
            };

            entries.push(CacheEntry {
                driver_path: entry.path().join(names.driver_file),
                dir_name,
                version,
            });
        }

        entries.sort_by(|a, b| a.dir_name.cmp(&b.dir_name));
        Ok(entries)
    }

    /// Path of a cached driver for the short version of `version`
    ///
    /// Never touches the network. Entries whose driver file is missing are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `MalformedVersion` for an unparsable version and `Io` if the
    /// cache root cannot be listed.
    pub fn locate(&self, version: &str) -> Result<Option<PathBuf>> {
        let metadata = resolve(version, self.platform)?;
        let short = metadata.short_version();

        for entry in self.entries()? {
            if entry.version.short() != short {
                continue;
            }
            if entry.is_present() {
                tracing::debug!("cache hit for {}: {}", version, entry.driver_path.display());
                return Ok(Some(entry.driver_path));
            }
            tracing::debug!("skipping {}: no {}", entry.dir_name, metadata.driver_file_name);
        }

        Ok(None)
    }

    /// Returns the cached driver for `version`, downloading and staging it
    /// first if needed
    ///
    /// Staging runs under an advisory lock per cache directory; a caller that
    /// waited on the lock picks up the driver the holder staged. `None` means
    /// the archive held no driver file.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`resolve`], link resolution, transfer,
    /// extraction and locking. Nothing is retried.
    pub fn ensure(&self, version: &str) -> Result<Option<PathBuf>> {
        if let Some(path) = self.locate(version)? {
            return Ok(Some(path));
        }

        let metadata = resolve(version, self.platform)?;
        let _lock = acquire_stage_lock(&self.root, &metadata.root_dir_name, self.lock_timeout)?;

        if let Some(path) = self.locate(version)? {
            tracing::info!("chromedriver {} was staged while waiting for the lock", version);
            return Ok(Some(path));
        }

        self.stage(&metadata)?;
        self.locate(version)
    }

    /// Downloads, extracts and consolidates into `<root>/<root_dir_name>`
    fn stage(&self, metadata: &ArtifactMetadata) -> Result<Option<PathBuf>> {
        let url = self
            .index
            .download_url(&metadata.short_version(), metadata.archive_file_name)?;

        let dir = self.root.join(&metadata.root_dir_name);
        fs::create_dir_all(&dir)
            .map_err(|e| DriverError::io(format!("create directory {}", dir.display()), e))?;

        let archive_path = dir.join(metadata.archive_file_name);
        if let Some(report) = self.report {
            report(&StageEvent::Downloading {
                url: &url,
                archive: &archive_path,
            });
        }
        tracing::info!("downloading {} to {}", url, archive_path.display());
        http::download_to_file(self.index.client(), &url, &archive_path, self.progress)?;

        archive::extract_zip(&archive_path, &dir)?;
        let staged = archive::consolidate(&dir, metadata.driver_file_name)?;

        if let Some(driver) = &staged {
            tracing::info!("staged chromedriver {} at {}", metadata.version, driver.display());
            if let Some(report) = self.report {
                report(&StageEvent::Staged { dir: &dir });
            }
        }
        Ok(staged)
    }
}
