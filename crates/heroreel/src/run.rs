use std::path::PathBuf;

use anyhow::{Context, Result};
use renderer::{run_window, HostConfig};
use slideconfig::DeckConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, RunArgs};
use crate::deck::DeckInputs;
use crate::paths::AppPaths;
use crate::snapshot::render_snapshot;

const DEFAULT_WINDOW_SIZE: (u32, u32) = (1920, 1080);

pub fn run(cli: Cli) -> Result<()> {
    initialise_tracing();

    let deck_path = resolve_deck_path(&cli.run)?;
    let config = DeckConfig::load(&deck_path)
        .with_context(|| format!("failed to load deck from {}", deck_path.display()))?;
    tracing::debug!(
        deck = %deck_path.display(),
        slides = config.slides.len(),
        "loaded deck"
    );
    let mut inputs = DeckInputs::from_config(&config);

    match cli.command {
        Some(Command::Snapshot(args)) => render_snapshot(&inputs, &args),
        None => {
            if let Some(autoplay) = cli.run.autoplay {
                inputs.options.autoplay = Some(autoplay).filter(|value| !value.is_zero());
            }
            tracing::info!(
                slides = inputs.slides.len(),
                autoplay = ?inputs.options.autoplay,
                "starting slideshow"
            );
            run_window(HostConfig {
                title: "heroreel".to_string(),
                size: cli.run.size.unwrap_or(DEFAULT_WINDOW_SIZE),
                slides: inputs.slides,
                options: inputs.options,
                fallback: inputs.fallback,
            })
        }
    }
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn resolve_deck_path(args: &RunArgs) -> Result<PathBuf> {
    if let Some(path) = args.config.as_ref() {
        return Ok(path.clone());
    }
    let paths = AppPaths::discover()?;
    tracing::debug!(config = %paths.config_dir().display(), "resolved heroreel paths");
    Ok(paths.default_deck())
}
