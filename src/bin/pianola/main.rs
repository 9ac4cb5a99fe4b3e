//! pianola - terminal keyboard with performance recording and replay
//!
//! Run with: cargo run -- [--config pianola.toml] [--file take.json]

mod app;
mod ui;

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use env_logger::{Env, Target};

use app::Pianola;
use pianola::{io, SynthConfig};

#[derive(Parser)]
#[command(name = "pianola")]
#[command(about = "Polyphonic key synthesizer that records and replays performances", long_about = None)]
struct Cli {
    /// TOML config file (written with defaults if missing)
    #[arg(short, long, default_value = "pianola.toml")]
    config: PathBuf,

    /// Override the number of octaves on the keyboard
    #[arg(short, long)]
    octaves: Option<usize>,

    /// Performance file used by save (Ctrl-S) and load (Ctrl-O)
    #[arg(short, long, default_value = "performance.json")]
    file: PathBuf,

    /// Where log output goes (the terminal belongs to the UI)
    #[arg(long, default_value = "pianola.log")]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a saved performance to a 16-bit mono WAV file
    Render {
        /// Performance file (.json or text)
        performance: PathBuf,

        /// Output WAV file path
        output: PathBuf,

        /// Silence kept after the last event, in milliseconds
        #[arg(long, default_value = "1000")]
        tail_ms: u64,
    },
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    init_logging(&cli.log_file)?;

    let mut config = SynthConfig::load_or_default(&cli.config);
    if let Some(octaves) = cli.octaves {
        config = config.octaves(octaves).sanitized();
    }

    match cli.command {
        Some(Commands::Render {
            performance,
            output,
            tail_ms,
        }) => render(&config, &performance, &output, tail_ms),
        None => Pianola::new(config, cli.file).run(),
    }
}

fn init_logging(path: &Path) -> EyreResult<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn render(config: &SynthConfig, performance: &Path, output: &Path, tail_ms: u64) -> EyreResult<()> {
    let timeline = io::load(performance)
        .wrap_err_with(|| format!("failed to load {}", performance.display()))?;
    if timeline.is_empty() {
        return Err(eyre!("{} holds no events", performance.display()));
    }

    let tail_frames = tail_ms.saturating_mul(config.sample_rate as u64) / 1000;
    let frames = io::render_to_wav(output, config, &timeline, tail_frames)
        .wrap_err_with(|| format!("failed to render {}", output.display()))?;

    println!(
        "Rendered {} events to {} ({:.2}s at {} Hz)",
        timeline.len(),
        output.display(),
        frames as f64 / config.sample_rate as f64,
        config.sample_rate
    );
    Ok(())
}
