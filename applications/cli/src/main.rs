/// Pixel Audio - probe and play sound effect files
mod config;

use crate::config::AppConfig;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use pixel_audio::Dispatcher;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "pixel=info,pixel_audio=info,pixel_playback=info";

#[derive(Parser)]
#[command(name = "pixel")]
#[command(about = "Decode and play WAVE and Ogg Vorbis sound effects", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "PIXEL_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a file and print its format
    Probe {
        /// Audio file to inspect
        file: PathBuf,
    },
    /// Play a file on the default output device
    Play(PlayArgs),
}

#[derive(Args)]
#[cfg_attr(not(feature = "cpal-output"), allow(dead_code))]
struct PlayArgs {
    /// Audio file to play
    file: PathBuf,

    /// Repeat until interrupted
    #[arg(long = "loop")]
    looping: bool,

    /// Linear gain (defaults to the configured default volume)
    #[arg(long)]
    volume: Option<f32>,

    /// Speed factor (defaults to the configured default pitch)
    #[arg(long)]
    pitch: Option<f32>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing
    let default_filter = config.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Probe { file } => probe(&file),
        Commands::Play(args) => play(&config, &args),
    }
}

fn probe(file: &std::path::Path) -> anyhow::Result<()> {
    let (kind, clip) = Dispatcher::new()
        .load_file(file)
        .with_context(|| format!("Failed to decode {}", file.display()))?;

    println!("File:        {}", file.display());
    println!("Container:   {}", kind);
    println!("Layout:      {}", clip.layout);
    println!("Sample rate: {}", clip.sample_rate);
    println!("Payload:     {} bytes", clip.data.len());
    println!("Frames:      {}", clip.frames());
    println!("Duration:    {:.3} s", clip.duration_secs());
    Ok(())
}

#[cfg(feature = "cpal-output")]
fn play(config: &AppConfig, args: &PlayArgs) -> anyhow::Result<()> {
    use pixel_playback::{AudioSession, CpalBackend};
    use std::time::Duration;

    let backend = CpalBackend::new().context("Failed to open audio output")?;
    let mut session = AudioSession::open(config.session.clone(), backend)?;
    let buffer = session
        .load_file(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let mut options = session.default_options().looping(args.looping);
    if let Some(volume) = args.volume {
        options = options.volume(volume);
    }
    if let Some(pitch) = args.pitch {
        options = options.pitch(pitch);
    }

    let source = session.play(buffer, options)?;
    tracing::info!(
        file = %args.file.display(),
        source = %source,
        looping = options.looping,
        "Playing"
    );

    while session.is_playing(source)? {
        std::thread::sleep(Duration::from_millis(20));
    }

    session.stop(source)?;
    session.unload(buffer)?;
    session.close()?;
    Ok(())
}

#[cfg(not(feature = "cpal-output"))]
fn play(_config: &AppConfig, args: &PlayArgs) -> anyhow::Result<()> {
    anyhow::bail!(
        "cannot play {}: pixel was built without audio output (rebuild with --features cpal-output)",
        args.file.display()
    )
}
