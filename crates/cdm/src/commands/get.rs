//! `cdm get` - resolve, download if needed and print the driver path

use crate::context::Context;
use crate::output;
use anyhow::{Result, bail};
use cdm_driver::StageEvent;

/// Execute `cdm get <version>`
pub fn run(ctx: &Context, version: &str) -> Result<()> {
    let cache = ctx
        .driver_cache()?
        .with_progress(progress_callback)
        .with_report(report_stage);

    match cache.ensure(version)? {
        Some(path) => {
            output::print_text(&path.display().to_string())?;
            Ok(())
        }
        None => bail!(
            "chromedriver {} was downloaded but the archive holds no '{}'",
            version,
            ctx.platform.names().driver_file
        ),
    }
}

/// Progress callback for download
fn progress_callback(downloaded: u64, total: u64) {
    output::print_progress(downloaded, total).ok();
}

fn report_stage(event: &StageEvent<'_>) {
    let line = match event {
        StageEvent::Downloading { url, .. } => format!("Downloading {}", url),
        StageEvent::Staged { dir } => format!("Download complete: {}", dir.display()),
    };
    output::print_text(&line).ok();
}
