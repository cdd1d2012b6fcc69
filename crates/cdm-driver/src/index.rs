//! Link resolution against the mirror's version indexes
//!
//! The mirror publishes one JSON listing per naming scheme. Each entry is a
//! version directory such as `{"name": "114.0.5735.90/", "type": "dir"}`; the
//! first entry under the requested short version decides the full version
//! that goes into the CDN URL.

use crate::error::{DriverError, Result};
use crate::http;
use crate::platform::{NamingScheme, PlatformNames};
use crate::version::ShortVersion;
use reqwest::blocking::Client;
use serde::Deserialize;
use url::Url;

/// Base URLs of the npm mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mirror {
    /// Hosts `-/binary/chromedriver/` and `-/binary/chrome-for-testing/`
    pub registry: Url,
    /// Hosts `binaries/...` archives
    pub cdn: Url,
}

/// One row of a version index; other fields are ignored
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: String,
}

impl IndexEntry {
    /// Full version named by this entry (`"114.0.5735.90/"` → `"114.0.5735.90"`)
    pub fn version(&self) -> &str {
        self.name.trim_end_matches('/')
    }
}

impl Mirror {
    pub fn new(registry: Url, cdn: Url) -> Self {
        Self { registry, cdn }
    }

    /// Index listing for `scheme`
    pub fn index_url(&self, scheme: NamingScheme) -> Result<Url> {
        let mut url = self.registry.clone();
        append_segments(&mut url, &split_path(scheme.index_path()))?;
        // Listings are directories; keep the trailing slash
        url.path_segments_mut()
            .map_err(|_| cannot_be_a_base(&self.registry))?
            .push("");
        Ok(url)
    }

    /// CDN location of `archive` for `full_version` under `scheme`
    ///
    /// Legacy: `binaries/chromedriver/<full>/<archive>`.
    /// Modern: `binaries/chrome-for-testing/<full>/<os-segment>/<archive>`.
    ///
    /// # Errors
    ///
    /// Returns `UnknownArchive` unless `archive` is a platform archive name of
    /// `scheme`.
    pub fn archive_url(
        &self,
        scheme: NamingScheme,
        full_version: &str,
        archive: &str,
    ) -> Result<Url> {
        let names = PlatformNames::for_archive(archive)
            .filter(|names| names.archive(scheme) == archive)
            .ok_or_else(|| DriverError::UnknownArchive {
                name: archive.to_string(),
                scheme,
            })?;

        let mut url = self.cdn.clone();
        match scheme {
            NamingScheme::Legacy => append_segments(
                &mut url,
                &["binaries", scheme.cdn_family(), full_version, archive],
            )?,
            NamingScheme::Modern => append_segments(
                &mut url,
                &[
                    "binaries",
                    scheme.cdn_family(),
                    full_version,
                    names.os_segment,
                    archive,
                ],
            )?,
        }
        Ok(url)
    }
}

/// Resolves download links through a mirror
#[derive(Debug, Clone)]
pub struct IndexClient {
    client: Client,
    mirror: Mirror,
}

impl IndexClient {
    pub fn new(client: Client, mirror: Mirror) -> Self {
        Self { client, mirror }
    }

    /// HTTP client shared with archive downloads
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Fetches and parses the version index for `scheme`
    ///
    /// # Errors
    ///
    /// Returns `Transfer` if the request fails and `InvalidIndex` if the body
    /// is not a JSON array of objects with a `name`.
    pub fn fetch_index(&self, scheme: NamingScheme) -> Result<Vec<IndexEntry>> {
        let url = self.mirror.index_url(scheme)?;
        self.fetch_listing(&url)
    }

    fn fetch_listing(&self, url: &Url) -> Result<Vec<IndexEntry>> {
        tracing::debug!("fetching version index {}", url);

        let body = http::fetch_text(&self.client, url)?;
        serde_json::from_str(&body).map_err(|e| DriverError::InvalidIndex {
            url: url.clone(),
            source: e,
        })
    }

    /// Builds the CDN URL of `archive_file_name` for the first build the
    /// index lists under `short`
    ///
    /// The scheme, and with it the index queried, follows `short.major`.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` when no entry starts with `"<short>."`,
    /// `UnknownArchive` unless the archive name belongs to that scheme, and the
    /// errors of [`IndexClient::fetch_index`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cdm_driver::{IndexClient, Mirror, ShortVersion, http};
    /// use url::Url;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mirror = Mirror::new(
    ///     Url::parse("https://registry.npmmirror.com/")?,
    ///     Url::parse("https://cdn.npmmirror.com/")?,
    /// );
    /// let index = IndexClient::new(http::build_client(http::DEFAULT_TIMEOUT)?, mirror);
    /// let short: ShortVersion = "114.0".parse()?;
    /// let url = index.download_url(&short, "chromedriver-linux64.zip")?;
    /// println!("{}", url);
    /// # Ok(())
    /// # }
    /// ```
    pub fn download_url(&self, short: &ShortVersion, archive_file_name: &str) -> Result<Url> {
        let scheme = NamingScheme::for_major(short.major);
        let index_url = self.mirror.index_url(scheme)?;
        let entries = self.fetch_listing(&index_url)?;

        let full_version =
            find_full_version(&entries, short).ok_or_else(|| DriverError::VersionNotFound {
                short_version: short.to_string(),
                index: index_url.clone(),
            })?;

        let url = self
            .mirror
            .archive_url(scheme, full_version, archive_file_name)?;
        tracing::debug!("resolved {} to {}", short, url);
        Ok(url)
    }
}

/// First entry, in index order, under `short`
pub fn find_full_version<'a>(
    entries: &'a [IndexEntry],
    short: &ShortVersion,
) -> Option<&'a str> {
    let prefix = short.prefix();
    entries
        .iter()
        .map(IndexEntry::version)
        .find(|version| version.starts_with(&prefix))
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Appends percent-encoded segments after the base path
fn append_segments(url: &mut Url, segments: &[&str]) -> Result<()> {
    let base = url.clone();
    url.path_segments_mut()
        .map_err(|_| cannot_be_a_base(&base))?
        .pop_if_empty()
        .extend(segments);
    Ok(())
}

fn cannot_be_a_base(url: &Url) -> DriverError {
    DriverError::InvalidMirror(url.clone())
}
