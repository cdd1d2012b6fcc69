//! Version resolution: requested version + platform → artifact names

use crate::error::Result;
use crate::platform::{HostPlatform, NamingScheme};
use crate::version::{DriverVersion, ShortVersion};

/// Names needed to fetch, stage and find one driver build
///
/// Computed per request from the version string and platform; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactMetadata {
    pub version: DriverVersion,
    pub platform: HostPlatform,
    pub scheme: NamingScheme,
    /// Canonical cache subdirectory (`linux114.0.5735.90` on Linux)
    pub root_dir_name: String,
    pub archive_file_name: &'static str,
    pub driver_file_name: &'static str,
}

impl ArtifactMetadata {
    pub fn short_version(&self) -> ShortVersion {
        self.version.short()
    }
}

/// Resolves the artifact names for `version` on `platform`
///
/// # Errors
///
/// Returns `MalformedVersion` if `version` is not a dotted numeric version
/// with two to four components.
///
/// # Examples
///
/// ```
/// use cdm_driver::{HostPlatform, resolve};
///
/// let metadata = resolve("89.0.4389.23", HostPlatform::Linux)?;
/// assert_eq!(metadata.root_dir_name, "linux89.0.4389.23");
/// assert_eq!(metadata.archive_file_name, "chromedriver_linux64.zip");
/// assert_eq!(metadata.driver_file_name, "chromedriver");
/// # Ok::<(), cdm_driver::DriverError>(())
/// ```
pub fn resolve(version: &str, platform: HostPlatform) -> Result<ArtifactMetadata> {
    let version = DriverVersion::parse(version)?;
    let scheme = NamingScheme::for_major(version.major());
    let names = platform.names();

    Ok(ArtifactMetadata {
        root_dir_name: format!("{}{}", names.dir_prefix, version.as_str()),
        archive_file_name: names.archive(scheme),
        driver_file_name: names.driver_file,
        version,
        platform,
        scheme,
    })
}
