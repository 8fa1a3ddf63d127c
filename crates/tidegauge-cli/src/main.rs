//! Tidegauge CLI - sea-level series from uploads, remote data, or the estimate.

mod cli;
mod commands;
mod server;

use std::io;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let config = match commands::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Synth {
            params,
            noise,
            seed,
            demo,
            format,
        } => commands::synth::run(config, params, noise, seed, demo, format),

        Commands::Infer {
            file,
            clip,
            rebase,
            anchor,
            strict,
            format,
        } => commands::infer::run(config, file, clip, rebase, anchor, strict, format),

        Commands::Fetch { urls, splice, format } => {
            commands::fetch::run(config, urls, splice, format)
        }

        Commands::Exposure { rise, json } => commands::exposure::run(rise, json),

        Commands::Summary { file, json } => commands::summary::run(config, file, json),

        Commands::Serve { port } => commands::serve::run(config, port),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
