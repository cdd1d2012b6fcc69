//! Layered configuration
//!
//! Values are resolved in this order, later layers winning:
//!
//! 1. Built-in defaults
//! 2. Config file (`--config <path>`, else `<config dir>/cdm/config.toml` if present)
//! 3. Environment (`CDM_CACHE_DIR`, `CDM_REGISTRY_URL`, `CDM_CDN_URL`, `CDM_PLATFORM`)
//!
//! CLI flags are applied on top by the binary.

mod model;

pub use model::{
    CacheConfig, Config, DEFAULT_CDN, DEFAULT_REGISTRY, MirrorConfig, NetworkConfig,
};

use crate::error::{CdmError, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable overriding the cache root
pub const ENV_CACHE_DIR: &str = "CDM_CACHE_DIR";
/// Environment variable overriding the index registry
pub const ENV_REGISTRY_URL: &str = "CDM_REGISTRY_URL";
/// Environment variable overriding the archive CDN
pub const ENV_CDN_URL: &str = "CDM_CDN_URL";
/// Environment variable overriding the target platform
pub const ENV_PLATFORM: &str = "CDM_PLATFORM";

impl Config {
    /// Reads a config file
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be read and `ConfigParseError`
    /// if it is not valid TOML for this schema.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CdmError::ConfigParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Loads the fully layered configuration from the process environment
    ///
    /// An explicit path must exist; the default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit, default_config_path(), |key| {
            std::env::var(key).ok()
        })
    }

    /// Layering with injectable default path and environment lookup
    pub fn load_with<F>(
        explicit: Option<&Path>,
        default_path: Option<PathBuf>,
        env: F,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match default_path.filter(|p| p.is_file()) {
                Some(path) => {
                    tracing::debug!("loading config from {}", path.display());
                    Self::from_file(&path)?
                }
                None => Self::default(),
            },
        };

        config.apply_env(env);
        config.validate()?;
        Ok(config)
    }

    /// Applies `CDM_*` overrides; empty values are ignored
    pub fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = lookup(ENV_CACHE_DIR) {
            self.cache.dir = Some(PathBuf::from(dir));
        }
        if let Some(registry) = lookup(ENV_REGISTRY_URL) {
            self.mirror.registry = registry;
        }
        if let Some(cdn) = lookup(ENV_CDN_URL) {
            self.mirror.cdn = cdn;
        }
        if let Some(platform) = lookup(ENV_PLATFORM) {
            self.platform = Some(platform);
        }
    }

    /// Checks values that serde cannot
    pub fn validate(&self) -> Result<()> {
        self.registry_url()?;
        self.cdn_url()?;

        if self.cache.lock_timeout_secs == 0 {
            return Err(CdmError::ConfigInvalidValue {
                field: "cache.lock_timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.network.timeout_secs == 0 {
            return Err(CdmError::ConfigInvalidValue {
                field: "network.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    pub fn registry_url(&self) -> Result<Url> {
        parse_base_url("mirror.registry", &self.mirror.registry)
    }

    pub fn cdn_url(&self) -> Result<Url> {
        parse_base_url("mirror.cdn", &self.mirror.cdn)
    }

    /// Cache root: configured directory, else `<cache dir>/cdm/chromedriver`
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache.dir {
            Some(dir) => Ok(dir.clone()),
            None => default_cache_dir(),
        }
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.cache.lock_timeout_secs)
    }

    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.network.timeout_secs)
    }
}

/// `<config dir>/cdm/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("cdm").join("config.toml"))
}

/// Platform-specific paths:
/// - macOS: ~/Library/Caches/cdm/chromedriver
/// - Linux: ~/.cache/cdm/chromedriver
/// - Windows: %LOCALAPPDATA%\cdm\chromedriver
pub fn default_cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().ok_or(CdmError::CacheDirUnavailable)?;
    Ok(base.join("cdm").join("chromedriver"))
}

/// Parses a base URL and normalizes it to end with `/` so joins append
fn parse_base_url(field: &str, raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).map_err(|e| CdmError::ConfigInvalidValue {
        field: field.to_string(),
        reason: format!("'{}' is not a valid URL: {}", raw, e),
    })?;

    if url.cannot_be_a_base() {
        return Err(CdmError::ConfigInvalidValue {
            field: field.to_string(),
            reason: format!("'{}' cannot be used as a base URL", raw),
        });
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_file_or_env() {
        let config = Config::load_with(None, None, env_from(&[])).unwrap();

        assert_eq!(config.platform, None);
        assert_eq!(config.cache.dir, None);
        assert_eq!(config.cache.lock_timeout_secs, 300);
        assert_eq!(config.mirror.registry, DEFAULT_REGISTRY);
        assert_eq!(config.mirror.cdn, DEFAULT_CDN);
        assert_eq!(config.network_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = cdm_testkit::temp_dir_in_workspace();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[cache]
dir = "/srv/drivers"
"#,
        )
        .unwrap();

        let config = Config::load_with(Some(&path), None, env_from(&[])).unwrap();

        assert_eq!(config.cache.dir, Some(PathBuf::from("/srv/drivers")));
        assert_eq!(config.cache.lock_timeout_secs, 300);
        assert_eq!(config.mirror.registry, DEFAULT_REGISTRY);
    }

    #[test]
    fn test_default_path_is_optional() {
        let temp = cdm_testkit::temp_dir_in_workspace();
        let missing = temp.path().join("nope.toml");

        let config = Config::load_with(None, Some(missing), env_from(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let temp = cdm_testkit::temp_dir_in_workspace();
        let missing = temp.path().join("nope.toml");

        let result = Config::load_with(Some(&missing), None, env_from(&[]));
        assert!(matches!(result, Err(CdmError::IoError(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = cdm_testkit::temp_dir_in_workspace();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
platform = "windows"

[mirror]
registry = "https://file.example"
"#,
        )
        .unwrap();

        let env = env_from(&[
            (ENV_REGISTRY_URL, "http://127.0.0.1:9999"),
            (ENV_CACHE_DIR, "/tmp/cdm-cache"),
            (ENV_PLATFORM, "linux"),
            (ENV_CDN_URL, ""),
        ]);
        let config = Config::load_with(Some(&path), None, env).unwrap();

        assert_eq!(config.mirror.registry, "http://127.0.0.1:9999");
        assert_eq!(config.mirror.cdn, DEFAULT_CDN, "empty env value is ignored");
        assert_eq!(config.cache_dir().unwrap(), PathBuf::from("/tmp/cdm-cache"));
        assert_eq!(config.platform.as_deref(), Some("linux"));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let temp = cdm_testkit::temp_dir_in_workspace();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[cache\ndir = ").unwrap();

        let result = Config::load_with(Some(&path), None, env_from(&[]));
        match result {
            Err(CdmError::ConfigParseError { path: p, .. }) => assert_eq!(p, path),
            other => panic!("Expected ConfigParseError, got: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_url_rejected() {
        let env = env_from(&[(ENV_CDN_URL, "not a url")]);
        let result = Config::load_with(None, None, env);

        match result {
            Err(CdmError::ConfigInvalidValue { field, .. }) => assert_eq!(field, "mirror.cdn"),
            other => panic!("Expected ConfigInvalidValue, got: {:?}", other),
        }
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.network.timeout_secs = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("network.timeout_secs"));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let mut config = Config::default();
        config.mirror.cdn = "https://mirror.example/chrome".to_string();

        let url = config.cdn_url().unwrap();
        assert_eq!(url.as_str(), "https://mirror.example/chrome/");
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn test_default_cache_dir_linux() {
        if let Ok(dir) = default_cache_dir() {
            assert!(dir.ends_with("cdm/chromedriver"));
        }
    }
}
