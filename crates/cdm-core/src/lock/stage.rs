use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

const FIRST_DELAY: Duration = Duration::from_millis(10);
const MAX_DELAY: Duration = Duration::from_millis(500);

/// Exclusive hold on one cache directory; released on drop
#[derive(Debug)]
pub struct StageLock {
    pub(super) file: File,
    pub(super) path: PathBuf,
    pub(super) dir_name: String,
}

impl StageLock {
    /// Lock file backing this hold (`<root>/.locks/<dir_name>.lock`)
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cache directory this lock guards
    pub fn dir_name(&self) -> &str {
        &self.dir_name
    }
}

impl Drop for StageLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        tracing::debug!("released stage lock for {}", self.dir_name);
    }
}

/// Doubling retry delay, capped at `MAX_DELAY`
pub(super) struct Backoff {
    delay: Duration,
}

impl Backoff {
    pub(super) fn new() -> Self {
        Self { delay: FIRST_DELAY }
    }

    pub(super) fn next_delay(&mut self) -> Duration {
        let current = self.delay;
        self.delay = (self.delay * 2).min(MAX_DELAY);
        current
    }
}
