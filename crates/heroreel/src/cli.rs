use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use renderer::Direction;

#[derive(Parser, Debug)]
#[command(
    name = "heroreel",
    author,
    version,
    about = "Full-bleed hero slideshow with motion-blur transitions",
    arg_required_else_help = false
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Deck file; defaults to `deck.toml` in the user config directory.
    #[arg(long, value_name = "PATH", env = "HEROREEL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Initial window size (e.g. `1920x1080`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// Override the deck's autoplay interval (`5s`, `4500ms`; `0` disables).
    #[arg(long, value_name = "DURATION", value_parser = slideconfig::parse_duration)]
    pub autoplay: Option<Duration>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a single transition frame to a PNG without opening a window.
    Snapshot(SnapshotArgs),
}

#[derive(Parser, Debug)]
pub struct SnapshotArgs {
    /// Index of the outgoing slide.
    #[arg(long, default_value_t = 0)]
    pub from: usize,

    /// Index of the incoming slide.
    #[arg(long, default_value_t = 1)]
    pub to: usize,

    /// Eased transition progress in `[0, 1]`.
    #[arg(long, default_value_t = 0.5)]
    pub progress: f32,

    /// Output size.
    #[arg(
        long,
        value_name = "WIDTHxHEIGHT",
        value_parser = parse_surface_size,
        default_value = "1280x720"
    )]
    pub size: (u32, u32),

    #[arg(long, value_name = "FILE")]
    pub output: PathBuf,

    /// Blur direction; inferred from the indices when omitted.
    #[arg(long, value_enum)]
    pub direction: Option<DirectionArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    Forward,
    Backward,
}

impl From<DirectionArg> for Direction {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::Forward => Direction::Forward,
            DirectionArg::Backward => Direction::Backward,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(spec: &str) -> Result<(u32, u32), String> {
    let trimmed = spec.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WxH format, e.g. 1920x1080".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| "invalid width in size specification".to_string())?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| "invalid height in size specification".to_string())?;

    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".to_string());
    }

    Ok((width, height))
}
