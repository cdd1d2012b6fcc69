//! Chromedriver version parsing
//!
//! Versions are dotted numeric strings with two to four components
//! (`114.0`, `114.0.5735`, `114.0.5735.90`). Only the first two, the short
//! version, matter for scheme selection and cache matching.

use crate::error::{DriverError, Result};
use std::fmt;
use std::str::FromStr;

/// Maximum number of dot-separated components (`major.minor.build.patch`)
pub const MAX_COMPONENTS: usize = 4;

/// Minimum number of components: a short version needs `major.minor`
pub const MIN_COMPONENTS: usize = 2;

/// A parsed driver version that remembers its original spelling
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DriverVersion {
    raw: String,
    components: [u32; MAX_COMPONENTS],
    len: usize,
}

/// `major.minor`, the granularity for cache matching and index lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShortVersion {
    pub major: u32,
    pub minor: u32,
}

impl DriverVersion {
    /// Parses a dotted version
    ///
    /// # Errors
    ///
    /// Returns `MalformedVersion` when the string has fewer than two or more
    /// than four components, or a component that is not all ASCII digits.
    pub fn parse(input: &str) -> Result<Self> {
        let malformed = |reason: String| DriverError::MalformedVersion {
            version: input.to_string(),
            reason,
        };

        let segments: Vec<&str> = input.split('.').collect();
        if segments.len() < MIN_COMPONENTS {
            return Err(malformed(format!(
                "expected at least {} dot-separated components",
                MIN_COMPONENTS
            )));
        }
        if segments.len() > MAX_COMPONENTS {
            return Err(malformed(format!(
                "expected at most {} dot-separated components, found {}",
                MAX_COMPONENTS,
                segments.len()
            )));
        }

        let mut components = [0u32; MAX_COMPONENTS];
        for (slot, segment) in components.iter_mut().zip(&segments) {
            // u32::from_str would accept a leading '+'
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed(format!("component '{}' is not a number", segment)));
            }
            *slot = segment
                .parse()
                .map_err(|_| malformed(format!("component '{}' is out of range", segment)))?;
        }

        Ok(Self {
            raw: input.to_string(),
            components,
            len: segments.len(),
        })
    }

    /// The version exactly as requested
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed components, in order
    pub fn components(&self) -> &[u32] {
        &self.components[..self.len]
    }

    pub fn major(&self) -> u32 {
        self.components[0]
    }

    pub fn minor(&self) -> u32 {
        self.components[1]
    }

    pub fn short(&self) -> ShortVersion {
        ShortVersion {
            major: self.major(),
            minor: self.minor(),
        }
    }
}

impl FromStr for DriverVersion {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DriverVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl ShortVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Prefix an index entry or full version must start with: `"114.0."`
    pub fn prefix(&self) -> String {
        format!("{}.{}.", self.major, self.minor)
    }
}

impl FromStr for ShortVersion {
    type Err = DriverError;

    /// Accepts `major.minor` or any longer version, keeping the first two parts
    fn from_str(s: &str) -> Result<Self> {
        DriverVersion::parse(s).map(|v| v.short())
    }
}

impl fmt::Display for ShortVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
