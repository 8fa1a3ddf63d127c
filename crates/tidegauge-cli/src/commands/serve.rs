//! Serve command - run the JSON API.

use colored::Colorize;
use tidegauge::{HttpSource, LoaderConfig, SeriesLoader};

use crate::server::{app, state::AppState};

pub fn run(config: LoaderConfig, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let source = HttpSource::with_config(&config.fetch)?;
    let loader = SeriesLoader::with_config(config).with_remote(source);
    let state = AppState::new(loader);

    let url = format!("http://localhost:{}", port);
    println!();
    println!(
        "{} {}",
        "Starting API server at".cyan().bold(),
        url.white().bold()
    );
    println!();
    println!("  GET  /api/series/synthetic");
    println!("  POST /api/series/infer");
    println!("  GET  /api/series/remote");
    println!("  GET  /api/exposure?rise=<m>");
    println!();
    println!("Press {} to stop the server", "Ctrl+C".yellow().bold());
    println!();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(app::run_server(state, port))
}
