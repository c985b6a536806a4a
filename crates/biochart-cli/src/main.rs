//! BioChart command-line interface
//!
//! Batch front end for the charting pipeline:
//! - Inspecting container headers
//! - Rendering (optionally transformed) signals to PNG
//! - Estimating heart rate from one signal
//! - Producing synthetic demo recordings

mod commands;

use anyhow::Result;
use biochart_processing::Transform;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "biochart")]
#[command(author, version, about = "Biosignal chart renderer", long_about = None)]
struct Cli {
    /// Enable verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print header and per-signal information of a container
    Info {
        /// Container file
        file: PathBuf,
    },

    /// Render container signals to a PNG image
    Render {
        /// Container file
        file: PathBuf,

        /// Output PNG file
        #[arg(short, long, default_value = "chart.png")]
        output: PathBuf,

        /// Transform applied to every channel (diff, lowpass:40, highpass:0.5,
        /// bandpass:0.5:40, ma:5, fft)
        #[arg(short, long)]
        transform: Option<Transform>,

        /// Draw the processed series (implied by --transform)
        #[arg(long)]
        processed: bool,

        /// Display configuration JSON (channel order, names, colours, ranges)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum number of signals to load
        #[arg(long)]
        max_signals: Option<usize>,

        /// Image width in pixels
        #[arg(long, default_value = "1200")]
        width: u32,

        /// Height of each channel track in pixels
        #[arg(long, default_value = "150")]
        track_height: u32,

        /// Horizontal viewport offset in seconds
        #[arg(long, default_value = "0.0")]
        offset: f64,

        /// Horizontal scale in pixels per second (fits the recording when omitted)
        #[arg(long)]
        scale: Option<f64>,

        /// Hide the background grid
        #[arg(long)]
        no_grid: bool,
    },

    /// Estimate heart rate from one signal
    HeartRate {
        /// Container file
        file: PathBuf,

        /// Signal index
        #[arg(short, long, default_value = "0")]
        signal: usize,
    },

    /// Generate the synthetic four-channel demo recording
    Synth {
        /// Output file: `.edf` writes a container, anything else a PNG
        #[arg(short, long, default_value = "demo.png")]
        output: PathBuf,

        /// Random seed for reproducible noise
        #[arg(long)]
        seed: Option<u64>,

        /// Image width in pixels
        #[arg(long, default_value = "1200")]
        width: u32,

        /// Height of each channel track in pixels
        #[arg(long, default_value = "150")]
        track_height: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Info { file } => commands::cmd_info(&file),

        Commands::Render {
            file,
            output,
            transform,
            processed,
            config,
            max_signals,
            width,
            track_height,
            offset,
            scale,
            no_grid,
        } => commands::cmd_render(commands::RenderArgs {
            file,
            output,
            transform,
            processed: processed || transform.is_some(),
            config,
            max_signals,
            width,
            track_height,
            offset,
            scale,
            grid: !no_grid,
        }),

        Commands::HeartRate { file, signal } => commands::cmd_heart_rate(&file, signal),

        Commands::Synth {
            output,
            seed,
            width,
            track_height,
        } => commands::cmd_synth(&output, seed, width, track_height),
    }
}
