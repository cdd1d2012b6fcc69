use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CdmError {
    // Config errors
    #[error("CONFIG_PARSE_ERROR: failed to parse {path}: {reason}")]
    ConfigParseError { path: PathBuf, reason: String },

    #[error("CONFIG_INVALID_VALUE: {field}: {reason}")]
    ConfigInvalidValue { field: String, reason: String },

    // Cache errors
    #[error("CACHE_DIR_UNAVAILABLE: could not determine the OS cache directory")]
    CacheDirUnavailable,

    // IO errors
    #[error("IO_ERROR: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CdmError>;
