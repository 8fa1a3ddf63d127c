//! CLI command implementations.

pub mod exposure;
pub mod fetch;
pub mod infer;
pub mod serve;
pub mod summary;
pub mod synth;

mod output;

use std::path::Path;

use tidegauge::LoaderConfig;

/// Read `--config` if given, else defaults.
pub fn load_config(path: Option<&Path>) -> Result<LoaderConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(format!("Config file not found: {}", path.display()).into());
            }
            Ok(LoaderConfig::load(path)?)
        }
        None => Ok(LoaderConfig::default()),
    }
}
