//! CLI command structure using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cdm")]
#[command(version, about = "Download and cache chromedriver builds", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: <config dir>/cdm/config.toml)
    #[arg(long, global = true, env = "CDM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache root holding one directory per driver version
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Target platform: linux, windows or macos (default: this machine)
    #[arg(long, global = true)]
    pub platform: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the path of a chromedriver, downloading it if needed
    Get {
        /// Driver version (e.g., "114.0.5735.90" or "89.0")
        version: String,
    },

    /// Print the path of a cached chromedriver without downloading
    Locate {
        /// Driver version (e.g., "114.0.5735.90" or "89.0")
        version: String,

        #[arg(long)]
        json: bool,
    },

    /// List cached chromedriver versions
    List {
        #[arg(long)]
        json: bool,
    },
}
