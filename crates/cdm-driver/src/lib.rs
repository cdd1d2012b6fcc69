//! Chromedriver resolution, download and local caching
//!
//! A requested version such as `114.0.5735.90` is mapped to the upstream
//! artifact names for a platform ([`resolve`]), linked to a CDN URL through
//! the mirror's version index ([`IndexClient`]), and staged into a local
//! cache directory ([`DriverCache`]) so later requests skip the network.
//!
//! # Example
//!
//! ```no_run
//! use cdm_driver::{DriverCache, HostPlatform, Mirror, http};
//! use url::Url;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mirror = Mirror::new(
//!     Url::parse("https://registry.npmmirror.com/")?,
//!     Url::parse("https://cdn.npmmirror.com/")?,
//! );
//! let client = http::build_client(http::DEFAULT_TIMEOUT)?;
//! let cache = DriverCache::new("/tmp/chromedriver", HostPlatform::detect()?, mirror, client);
//!
//! if let Some(driver) = cache.ensure("114.0.5735.90")? {
//!     println!("{}", driver.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod cache;
pub mod error;
pub mod http;
pub mod index;
pub mod platform;
pub mod resolver;
pub mod version;

pub use cache::{CacheEntry, DriverCache, StageEvent};
pub use error::{DriverError, Result};
pub use index::{IndexClient, IndexEntry, Mirror};
pub use platform::{HostPlatform, NamingScheme, PlatformNames};
pub use resolver::{ArtifactMetadata, resolve};
pub use version::{DriverVersion, ShortVersion};
