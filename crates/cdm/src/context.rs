//! Global context for CLI commands

use crate::cli::Cli;
use anyhow::Result;
use cdm_core::Config;
use cdm_driver::{DriverCache, HostPlatform, Mirror, http};

/// Layered configuration with the command-line overrides applied
pub struct Context {
    pub config: Config,
    pub platform: HostPlatform,
}

impl Context {
    /// Loads config (file, then `CDM_*` environment) and applies global flags
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read, parsed or validated
    /// - The platform name is unknown, or none is given on an unsupported OS
    pub fn new(cli: &Cli) -> Result<Self> {
        let mut config = Config::load(cli.config.as_deref())?;

        if let Some(dir) = &cli.cache_dir {
            config.cache.dir = Some(dir.clone());
        }
        if let Some(platform) = &cli.platform {
            config.platform = Some(platform.clone());
        }

        let platform = match config.platform.as_deref() {
            Some(name) => name.parse::<HostPlatform>()?,
            None => HostPlatform::detect()?,
        };
        tracing::debug!("target platform: {}", platform);

        Ok(Self { config, platform })
    }

    /// Driver cache rooted at the configured cache directory
    pub fn driver_cache(&self) -> Result<DriverCache> {
        let root = self.config.cache_dir()?;
        let mirror = Mirror::new(self.config.registry_url()?, self.config.cdn_url()?);
        let client = http::build_client(self.config.network_timeout())?;

        tracing::debug!("cache root: {}", root.display());
        Ok(DriverCache::new(root, self.platform, mirror, client)
            .with_lock_timeout(self.config.lock_timeout()))
    }
}
