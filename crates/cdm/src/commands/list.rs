//! `cdm list` - show cached driver versions for the target platform

use crate::context::Context;
use crate::output;
use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ListedEntry {
    dir_name: String,
    version: String,
    path: String,
    present: bool,
}

#[derive(Debug, Serialize)]
struct ListOutput {
    platform: String,
    cache_dir: String,
    entries: Vec<ListedEntry>,
}

/// Execute `cdm list`
pub fn run(ctx: &Context, json: bool) -> Result<()> {
    let cache = ctx.driver_cache()?;

    let entries: Vec<ListedEntry> = cache
        .entries()?
        .into_iter()
        .map(|entry| ListedEntry {
            present: entry.is_present(),
            version: entry.version.to_string(),
            path: entry.driver_path.display().to_string(),
            dir_name: entry.dir_name,
        })
        .collect();

    if json {
        let listing = ListOutput {
            platform: ctx.platform.to_string(),
            cache_dir: cache.root().display().to_string(),
            entries,
        };
        output::print_json(&serde_json::to_string_pretty(&listing)?)?;
        return Ok(());
    }

    if entries.is_empty() {
        output::print_text(&format!(
            "No chromedriver versions cached in {}",
            cache.root().display()
        ))?;
        return Ok(());
    }

    for entry in &entries {
        let marker = if entry.present { "" } else { "  (driver missing)" };
        output::print_text(&format!("{:<24} {}{}", entry.version, entry.path, marker))?;
    }
    Ok(())
}
