//! Error type for driver resolution, transfer and staging

use crate::platform::NamingScheme;
use cdm_core::lock::LockError;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum DriverError {
    // Version errors
    #[error("MALFORMED_VERSION: '{version}' is not a dotted numeric version: {reason}")]
    MalformedVersion { version: String, reason: String },

    #[error("VERSION_NOT_FOUND: no entry for {short_version} in index {index}")]
    VersionNotFound { short_version: String, index: Url },

    // Transfer errors
    #[error("TRANSFER_FAILED: {url}: {source}")]
    Transfer {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("TRANSFER_FAILED: {url}: connection lost mid-body: {source}")]
    TransferBody {
        url: Url,
        #[source]
        source: std::io::Error,
    },

    #[error("INVALID_INDEX: {url} did not return a version list: {source}")]
    InvalidIndex {
        url: Url,
        #[source]
        source: serde_json::Error,
    },

    #[error("INVALID_MIRROR: URL cannot be a base: {0}")]
    InvalidMirror(Url),

    #[error("HTTP_CLIENT: failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    // Archive errors
    #[error("EXTRACTION_FAILED: {archive}: {reason}")]
    Extraction { archive: PathBuf, reason: String },

    #[error("UNKNOWN_ARCHIVE: '{name}' is not a known {scheme:?} chromedriver archive")]
    UnknownArchive { name: String, scheme: NamingScheme },

    // Platform errors
    #[error("UNSUPPORTED_PLATFORM: {0}")]
    UnsupportedPlatform(String),

    // Cache errors
    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("IO_ERROR: {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

impl DriverError {
    pub(crate) fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        DriverError::Io {
            operation: operation.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DriverError>;
