mod cli;
mod commands;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use feed_engine::FeedSettings;
use feed_logging::{feed_info, LevelFilter, LogDestination};

use crate::cli::Cli;

const APP_DIR: &str = "feed_scraper";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let destination = match cli.log.clone() {
        Some(path) => LogDestination::Both(path),
        None => LogDestination::Terminal,
    };
    feed_logging::initialize(destination, level);

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let settings = load_settings(&config_path)?;
    feed_info!("Using settings from {:?}", config_path);

    commands::run(cli.command, settings).await
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("settings.ron")
}

fn load_settings(path: &Path) -> anyhow::Result<FeedSettings> {
    let mut settings = FeedSettings::load(path)
        .with_context(|| format!("loading settings from {}", path.display()))?;
    place_cache_in_user_dir(&mut settings);
    Ok(settings)
}

/// A relative cache path is taken to mean "inside the user cache directory".
fn place_cache_in_user_dir(settings: &mut FeedSettings) {
    if settings.tracking_cache_path.is_relative() {
        if let Some(cache) = dirs::cache_dir() {
            settings.tracking_cache_path = cache.join(APP_DIR).join(&settings.tracking_cache_path);
        }
    }
}
