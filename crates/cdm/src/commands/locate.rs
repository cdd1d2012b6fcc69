//! `cdm locate` - print a cached driver path, never touching the network

use crate::context::Context;
use crate::output;
use anyhow::{Result, bail};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct LocateInfo {
    version: String,
    platform: String,
    path: String,
}

/// Execute `cdm locate <version>`
pub fn run(ctx: &Context, version: &str, json: bool) -> Result<()> {
    let cache = ctx.driver_cache()?;

    let Some(path) = cache.locate(version)? else {
        bail!(
            "chromedriver {} is not cached in {} (run `cdm get {}`)",
            version,
            cache.root().display(),
            version
        );
    };

    if json {
        let info = LocateInfo {
            version: version.to_string(),
            platform: ctx.platform.to_string(),
            path: path.display().to_string(),
        };
        output::print_json(&serde_json::to_string_pretty(&info)?)?;
    } else {
        output::print_text(&path.display().to_string())?;
    }

    Ok(())
}
