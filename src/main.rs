use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sprite_animator::{
    composition::Animator,
    config::Config,
    transform::{Flip, Param, TransformSpec},
};

#[derive(Parser)]
#[command(
    name = "sprite-animator",
    version,
    about = "Render sprite animations to numbered PNG frames",
    long_about = "Sprite-Animator plays an event of a sprite element (a folder with one subdirectory of images per event) through a per-frame motion and writes every frame as Frame_000.png, Frame_001.png, ..."
)]
struct Cli {
    /// Element folder with one subdirectory per event
    #[arg(short, long)]
    sprites: PathBuf,

    /// Event (subdirectory) to play
    #[arg(short, long)]
    event: String,

    /// Output directory (overrides the configuration)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of frames to render
    #[arg(short = 'n', long, default_value_t = 24)]
    frames: u64,

    /// Restart the sprite cycle every N frames
    #[arg(long)]
    loop_period: Option<u64>,

    /// Starting x position (top-left)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    start_x: f64,

    /// Starting y position (top-left)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    start_y: f64,

    /// Horizontal movement in pixels per frame
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    dx: f64,

    /// Vertical movement in pixels per frame
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    dy: f64,

    /// Counter-clockwise rotation in degrees per frame
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    rotate: f64,

    /// Scale factor
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Mirror the sprites left to right
    #[arg(long)]
    flip: bool,

    /// Background image (defaults to a solid canvas from the configuration)
    #[arg(short, long)]
    background: Option<PathBuf>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    info!("Starting Sprite-Animator v{}", env!("CARGO_PKG_VERSION"));
    info!("Sprites: {:?}", cli.sprites);
    info!("Event: {}", cli.event);

    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    if let Some(output) = &cli.output {
        config.output.directory = output.clone();
    }
    info!("Output: {:?}", config.output.directory);

    let mut animator = Animator::new(config)?;
    if let Some(background) = &cli.background {
        animator
            .set_background_image(background)
            .with_context(|| format!("Failed to load background {:?}", background))?;
    }

    let name = cli
        .sprites
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("element")
        .to_string();
    animator
        .load_element(&name, &cli.sprites)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?
        .set_position(cli.start_x, cli.start_y);

    let flip = if cli.flip { Flip::Horizontal } else { Flip::None };
    let spec = TransformSpec::identity()
        .translate(Param::linear(0.0, cli.dx), Param::linear(0.0, cli.dy))
        .rotate(Param::linear(0.0, cli.rotate))
        .scale(cli.scale)
        .flip(flip);

    let reports = animator
        .animate(&name, &cli.event, &spec, 0..cli.frames, cli.loop_period)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    info!("Rendered {} frames", reports.len());
    if let Some(last) = reports.last().and_then(|r| r.artifacts.last()) {
        info!("Last frame: {:?}", last.location);
    }
    Ok(())
}
