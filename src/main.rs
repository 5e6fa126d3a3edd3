mod config;
mod model;
mod parser;
mod pipeline;
mod placeholder;
mod scraper;
mod storage;
mod utils;

#[cfg(test)]
mod test_support;

use clap::Parser;
use config::{load_config, AppConfig, Cli};
use pipeline::Pipeline;
use scraper::HttpFetcher;
use std::process::ExitCode;
use storage::HttpImageDownloader;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // Load configuration from file, if one was given
    let mut config: AppConfig = match &cli.config {
        Some(path) => match load_config(&path.to_string_lossy()) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("Config load error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => AppConfig::default(),
    };
    config.apply_cli(&cli);

    let fetcher = match HttpFetcher::new(&config.fetch) {
        Ok(f) => f,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let downloader = match HttpImageDownloader::new(&config.fetch.user_agent) {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to build image client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let pipeline = match Pipeline::new(&config, Box::new(fetcher), Box::new(downloader)) {
        Ok(p) => p,
        Err(e) => {
            error!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "Fetching images for {} into {}",
        config.data_file().display(),
        config.images_path().display()
    );
    match pipeline.run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Run aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}
