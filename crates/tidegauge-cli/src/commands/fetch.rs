//! Fetch command - load the remote dataset through the loader.

use tidegauge::{HttpSource, LoaderConfig, SeriesLoader, SeriesRequest};

use super::output::print_loaded;
use crate::cli::OutputFormat;

pub fn run(
    mut config: LoaderConfig,
    urls: Vec<String>,
    splice: bool,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if !urls.is_empty() {
        config.fetch.urls = urls;
    }
    if splice {
        config.splice_remote = true;
    }
    if config.fetch.urls.is_empty() {
        tracing::warn!("no remote URLs configured; pass --url or set fetch.urls in the config");
    }

    let source = HttpSource::with_config(&config.fetch)?;
    let mut loader = SeriesLoader::with_config(config).with_remote(source);
    let loaded = loader.load(SeriesRequest::Remote);
    print_loaded(&loaded, &format)
}
