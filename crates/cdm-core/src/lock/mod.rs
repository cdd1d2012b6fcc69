//! Per-directory stage locks under `<cache root>/.locks/`
//!
//! Staging a driver writes into a shared cache directory. Each directory has
//! its own lock file, `<root>/.locks/<dir_name>.lock`, so concurrent `ensure`
//! calls for one version serialize while different versions stage in
//! parallel. Locks are fs2 advisory locks and work across processes.

use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

mod error;
mod stage;

pub use error::LockError;
pub use stage::StageLock;

use stage::Backoff;

#[cfg(test)]
mod tests;

/// Directory below the cache root holding the lock files
pub const LOCK_DIR: &str = ".locks";

/// Log once a waiter has been blocked this long
const ANNOUNCE_AFTER: Duration = Duration::from_secs(2);

/// Lock file guarding `<root>/<dir_name>`
pub fn stage_lock_path(root: &Path, dir_name: &str) -> PathBuf {
    root.join(LOCK_DIR).join(format!("{dir_name}.lock"))
}

/// Takes the stage lock for `<root>/<dir_name>`, waiting up to `timeout`
///
/// The lock directory is created on demand. While another holder keeps the
/// lock, acquisition is retried with a doubling delay (10 ms up to 500 ms).
///
/// # Errors
///
/// Returns `Timeout` when the lock is still held after `timeout` and `Io` if
/// the lock file cannot be created or locked.
///
/// # Examples
///
/// ```no_run
/// use cdm_core::lock::acquire_stage_lock;
/// use std::path::Path;
/// use std::time::Duration;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = Path::new("/tmp/chromedriver");
/// let lock = acquire_stage_lock(root, "linux114.0.5735.90", Duration::from_secs(30))?;
/// // <root>/linux114.0.5735.90 is ours until `lock` drops
/// drop(lock);
/// # Ok(())
/// # }
/// ```
pub fn acquire_stage_lock(
    root: &Path,
    dir_name: &str,
    timeout: Duration,
) -> Result<StageLock, LockError> {
    let lock_dir = root.join(LOCK_DIR);
    fs::create_dir_all(&lock_dir)
        .map_err(|e| LockError::io("create lock directory", &lock_dir, e))?;

    let path = stage_lock_path(root, dir_name);
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)
        .map_err(|e| LockError::io("open lock file", &path, e))?;

    let started = Instant::now();
    let mut backoff = Backoff::new();
    let mut announced = false;

    // Retries reuse the descriptor opened above
    loop {
        match file.try_lock_exclusive() {
            Ok(()) => break,
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {}
            Err(e) => return Err(LockError::io("lock", &path, e)),
        }

        let waited = started.elapsed();
        if waited >= timeout {
            return Err(LockError::Timeout {
                dir_name: dir_name.to_string(),
                path,
                waited,
            });
        }
        if !announced && waited >= ANNOUNCE_AFTER {
            tracing::info!("waiting for another process staging {}", dir_name);
            announced = true;
        }

        thread::sleep(backoff.next_delay().min(timeout - waited));
    }

    tracing::debug!("acquired stage lock {}", path.display());
    Ok(StageLock {
        file,
        path,
        dir_name: dir_name.to_string(),
    })
}
