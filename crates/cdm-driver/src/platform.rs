//! Host platforms and the per-platform naming table
//!
//! Every platform-specific string lives in [`PlatformNames`]; callers look the
//! record up once instead of branching on the OS at each use.

use crate::error::{DriverError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// First major version published under the chrome-for-testing layout
pub const MODERN_SCHEME_MAJOR: u32 = 114;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostPlatform {
    Windows,
    Linux,
    #[serde(rename = "macos")]
    MacOS,
}

/// Upstream artifact layout, split at [`MODERN_SCHEME_MAJOR`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingScheme {
    /// `chromedriver_<os>.zip` under `binaries/chromedriver/<version>/`
    Legacy,
    /// `chromedriver-<os>.zip` under `binaries/chrome-for-testing/<version>/<os>/`
    Modern,
}

/// Per-platform names for both schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformNames {
    pub platform: HostPlatform,
    pub legacy_archive: &'static str,
    pub modern_archive: &'static str,
    /// Directory segment of the modern CDN layout
    pub os_segment: &'static str,
    pub driver_file: &'static str,
    /// Prefix of cache directory names
    pub dir_prefix: &'static str,
}

const PLATFORM_TABLE: [PlatformNames; 3] = [
    PlatformNames {
        platform: HostPlatform::Linux,
        legacy_archive: "chromedriver_linux64.zip",
        modern_archive: "chromedriver-linux64.zip",
        os_segment: "linux64",
        driver_file: "chromedriver",
        dir_prefix: "linux",
    },
    PlatformNames {
        platform: HostPlatform::Windows,
        legacy_archive: "chromedriver_win32.zip",
        modern_archive: "chromedriver-win32.zip",
        os_segment: "win32",
        driver_file: "chromedriver.exe",
        dir_prefix: "",
    },
    PlatformNames {
        platform: HostPlatform::MacOS,
        legacy_archive: "chromedriver_mac64.zip",
        modern_archive: "chromedriver-mac64.zip",
        os_segment: "mac64",
        driver_file: "webdriver",
        dir_prefix: "",
    },
];

impl HostPlatform {
    pub const ALL: [HostPlatform; 3] = [
        HostPlatform::Linux,
        HostPlatform::Windows,
        HostPlatform::MacOS,
    ];

    /// Platform of the running binary
    pub fn detect() -> Result<Self> {
        #[cfg(target_os = "macos")]
        return Ok(HostPlatform::MacOS);

        #[cfg(target_os = "linux")]
        return Ok(HostPlatform::Linux);

        #[cfg(target_os = "windows")]
        return Ok(HostPlatform::Windows);

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        Err(DriverError::UnsupportedPlatform(format!(
            "no chromedriver builds for {}",
            std::env::consts::OS
        )))
    }

    /// Naming record for this platform
    pub fn names(self) -> &'static PlatformNames {
        // The table holds exactly one record per variant
        match self {
            HostPlatform::Linux => &PLATFORM_TABLE[0],
            HostPlatform::Windows => &PLATFORM_TABLE[1],
            HostPlatform::MacOS => &PLATFORM_TABLE[2],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HostPlatform::Linux => "linux",
            HostPlatform::Windows => "windows",
            HostPlatform::MacOS => "macos",
        }
    }
}

impl FromStr for HostPlatform {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(HostPlatform::Linux),
            "windows" | "win" => Ok(HostPlatform::Windows),
            "macos" | "mac" | "darwin" => Ok(HostPlatform::MacOS),
            other => Err(DriverError::UnsupportedPlatform(format!(
                "unknown platform '{}' (expected linux, windows or macos)",
                other
            ))),
        }
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl NamingScheme {
    pub fn for_major(major: u32) -> Self {
        if major < MODERN_SCHEME_MAJOR {
            NamingScheme::Legacy
        } else {
            NamingScheme::Modern
        }
    }

    /// Path of the version index below the registry base
    pub fn index_path(self) -> &'static str {
        match self {
            NamingScheme::Legacy => "-/binary/chromedriver/",
            NamingScheme::Modern => "-/binary/chrome-for-testing/",
        }
    }

    /// First path segment below `binaries/` on the CDN
    pub fn cdn_family(self) -> &'static str {
        match self {
            NamingScheme::Legacy => "chromedriver",
            NamingScheme::Modern => "chrome-for-testing",
        }
    }
}

impl PlatformNames {
    pub fn archive(&self, scheme: NamingScheme) -> &'static str {
        match scheme {
            NamingScheme::Legacy => self.legacy_archive,
            NamingScheme::Modern => self.modern_archive,
        }
    }

    /// Reverse lookup from an archive file name of either scheme
    pub fn for_archive(name: &str) -> Option<&'static PlatformNames> {
        PLATFORM_TABLE
            .iter()
            .find(|names| names.legacy_archive == name || names.modern_archive == name)
    }
}
