use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default npm mirror registry serving the chromedriver version indexes
pub const DEFAULT_REGISTRY: &str = "https://registry.npmmirror.com";

/// Default CDN serving the chromedriver archives
pub const DEFAULT_CDN: &str = "https://cdn.npmmirror.com";

/// config.toml schema
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Target platform override (`linux`, `windows`, `macos`)
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub mirror: MirrorConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheConfig {
    /// Cache root; falls back to the OS cache directory when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default = "default_lock_timeout_secs")]
    pub lock_timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            lock_timeout_secs: default_lock_timeout_secs(),
        }
    }
}

fn default_lock_timeout_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MirrorConfig {
    #[serde(default = "default_registry")]
    pub registry: String,
    #[serde(default = "default_cdn")]
    pub cdn: String,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            registry: default_registry(),
            cdn: default_cdn(),
        }
    }
}

fn default_registry() -> String {
    DEFAULT_REGISTRY.to_string()
}

fn default_cdn() -> String {
    DEFAULT_CDN.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Per-request timeout; archives are fetched in one request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    300
}
