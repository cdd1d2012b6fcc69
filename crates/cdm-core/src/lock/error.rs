use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LockError {
    #[error(
        "LOCK_TIMEOUT: {dir_name} is still being staged by another process after {waited:?} (lock file {path})"
    )]
    Timeout {
        dir_name: String,
        path: PathBuf,
        waited: Duration,
    },

    #[error("LOCK_IO: {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LockError {
    pub(crate) fn io(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        LockError::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
