mod cli;
mod commands;
mod context;
mod logging;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use context::Context;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = Context::new(&cli).and_then(|ctx| match cli.command {
        Commands::Get { version } => commands::get::run(&ctx, &version),
        Commands::Locate { version, json } => commands::locate::run(&ctx, &version, json),
        Commands::List { json } => commands::list::run(&ctx, json),
    });

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
