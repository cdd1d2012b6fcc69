//! Zip extraction and consolidation of a staged driver directory
//!
//! A downloaded archive is unpacked next to itself, then the directory is
//! reduced to the single driver binary:
//!
//! ```text
//! linux114.0.5735.90/                      linux114.0.5735.90/
//! ├── chromedriver-linux64.zip             └── chromedriver
//! └── chromedriver-linux64/          =>
//!     ├── LICENSE.chromedriver
//!     └── chromedriver
//! ```

use crate::error::{DriverError, Result};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Extracts a zip archive into `dest_dir`
///
/// Entries whose names would escape `dest_dir` are skipped. Unix modes
/// recorded in the archive are restored on Unix.
///
/// # Errors
///
/// Returns `Extraction` if the archive is not a readable zip, `Io` if files
/// cannot be written.
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = fs::File::open(archive_path)
        .map_err(|e| DriverError::io(format!("open archive {}", archive_path.display()), e))?;

    let extraction_failed = |reason: String| DriverError::Extraction {
        archive: archive_path.to_path_buf(),
        reason,
    };

    let mut archive = zip::ZipArchive::new(file).map_err(|e| extraction_failed(e.to_string()))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| extraction_failed(e.to_string()))?;

        let outpath = match entry.enclosed_name() {
            Some(path) => dest_dir.join(path),
            None => {
                tracing::warn!("skipping unsafe archive entry '{}'", entry.name());
                continue;
            }
        };

        if entry.is_dir() {
            fs::create_dir_all(&outpath).map_err(|e| {
                DriverError::io(format!("create directory {}", outpath.display()), e)
            })?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DriverError::io(format!("create parent directory {}", parent.display()), e)
            })?;
        }

        let mut outfile = fs::File::create(&outpath)
            .map_err(|e| DriverError::io(format!("create file {}", outpath.display()), e))?;
        io::copy(&mut entry, &mut outfile)
            .map_err(|e| DriverError::io(format!("extract file {}", outpath.display()), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode)).map_err(|e| {
                    DriverError::io(format!("set permissions for {}", outpath.display()), e)
                })?;
            }
        }
    }

    tracing::debug!(
        "extracted {} entries from {} into {}",
        archive.len(),
        archive_path.display(),
        dest_dir.display()
    );
    Ok(())
}

/// First regular file named `driver_file_name` below `dir`, walking in
/// file-name order
pub fn find_driver(dir: &Path, driver_file_name: &str) -> Result<Option<PathBuf>> {
    let target = OsStr::new(driver_file_name);

    for entry in walkdir::WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            DriverError::io(format!("walk directory {}", dir.display()), io::Error::other(e))
        })?;

        if entry.file_type().is_file() && entry.file_name() == target {
            return Ok(Some(entry.into_path()));
        }
    }

    Ok(None)
}

/// Reduces `dir` to `dir/<driver_file_name>`
///
/// The first driver found by [`find_driver`] is moved to the top of `dir` and
/// every other file and subdirectory is removed, the archive included. When
/// no driver exists the directory is left untouched and `None` is returned.
///
/// # Errors
///
/// Returns `Io` if the tree cannot be walked, renamed or removed.
pub fn consolidate(dir: &Path, driver_file_name: &str) -> Result<Option<PathBuf>> {
    let Some(found) = find_driver(dir, driver_file_name)? else {
        tracing::warn!(
            "no '{}' found in {}; leaving extracted files in place",
            driver_file_name,
            dir.display()
        );
        return Ok(None);
    };

    // Moved aside first so removing its original parent cannot take it along
    let staged = dir.join(format!(".{}.staged", driver_file_name));
    fs::rename(&found, &staged).map_err(|e| {
        DriverError::io(
            format!("move {} to {}", found.display(), staged.display()),
            e,
        )
    })?;

    let read_dir = fs::read_dir(dir)
        .map_err(|e| DriverError::io(format!("read directory {}", dir.display()), e))?;

    for entry in read_dir {
        let entry = entry
            .map_err(|e| DriverError::io(format!("read directory {}", dir.display()), e))?;
        let path = entry.path();
        if path == staged {
            continue;
        }

        let file_type = entry
            .file_type()
            .map_err(|e| DriverError::io(format!("stat {}", path.display()), e))?;
        let removed = if file_type.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(|e| DriverError::io(format!("remove {}", path.display()), e))?;
    }

    let driver_path = dir.join(driver_file_name);
    fs::rename(&staged, &driver_path).map_err(|e| {
        DriverError::io(
            format!("move {} to {}", staged.display(), driver_path.display()),
            e,
        )
    })?;

    #[cfg(unix)]
    set_executable_permissions(&driver_path)?;

    Ok(Some(driver_path))
}

/// Adds the executable bits (owner, group, other)
#[cfg(unix)]
fn set_executable_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path)
        .map_err(|e| DriverError::io(format!("get metadata for {}", path.display()), e))?;

    let mut permissions = metadata.permissions();
    permissions.set_mode(permissions.mode() | 0o111);

    fs::set_permissions(path, permissions)
        .map_err(|e| DriverError::io(format!("set permissions for {}", path.display()), e))
}
