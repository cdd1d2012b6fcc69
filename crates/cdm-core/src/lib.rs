//! Shared infrastructure for cdm: error type, layered configuration and
//! advisory file locking.

// Core modules
pub mod config;
pub mod error;
pub mod lock;

// Re-export commonly used types
pub use config::Config;
pub use error::{CdmError, Result};
