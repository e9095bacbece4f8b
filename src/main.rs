// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use sleepscreen::config::Config;
use sleepscreen::constants::{ScrollPreset, file_formats};
use sleepscreen::utils::size_arg;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

mod cli;

#[derive(Parser)]
#[command(name = "sleepscreen")]
#[command(about = "Infinite diagonal photo-scroll background for kiosk idle screens")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Configuration file (default: ~/.config/sleepscreen/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the idle screen in the terminal
    Run {
        /// Directory of source images (overrides the config file)
        #[arg(short, long)]
        images: Option<PathBuf>,

        /// Motion preset (overrides speed, fps, margins and angle)
        #[arg(short, long, value_enum)]
        preset: Option<ScrollPreset>,

        /// Viewport pixels per terminal pixel
        #[arg(short, long, default_value = "8")]
        scale: u32,

        /// Seed for reproducible image picks
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the computed layout for a viewport as JSON
    Layout {
        /// Viewport size, e.g. 1920x1080
        #[arg(short, long, value_parser = size_arg)]
        viewport: (u32, u32),

        /// Tile size, e.g. 340x340
        #[arg(short, long, value_parser = size_arg, default_value = "340x340")]
        tile: (u32, u32),

        /// Diagonal tilt in degrees
        #[arg(short, long, default_value = "0")]
        angle: f32,

        /// Horizontal coverage margin
        #[arg(long, default_value = "1.05")]
        margin_x: f32,

        /// Vertical coverage margin
        #[arg(long, default_value = "1.05")]
        margin_y: f32,
    },

    /// List candidate images in a directory
    Images {
        /// Image directory
        dir: PathBuf,
    },

    /// Rescale every image in a directory to one width, in place
    Normalize {
        /// Image directory
        dir: PathBuf,

        /// Target width in pixels
        #[arg(short, long, default_value_t = file_formats::NORMALIZED_WIDTH)]
        width: u32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // The terminal viewer owns the screen, so its logs go to a file
    let to_file = matches!(cli.command, None | Some(Commands::Run { .. }));
    init_logging(to_file);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };

    match cli.command {
        Some(Commands::Run {
            images,
            preset,
            scale,
            seed,
        }) => {
            let mut config = config;
            if let Some(preset) = preset {
                config.apply_preset(preset);
            }
            if let Some(images) = images {
                config.image_dir = images;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            sleepscreen::terminal::run(config, scale)
        }
        Some(Commands::Layout {
            viewport,
            tile,
            angle,
            margin_x,
            margin_y,
        }) => cli::print_layout(viewport, tile, angle, margin_x, margin_y),
        Some(Commands::Images { dir }) => cli::list_images(&dir),
        Some(Commands::Normalize { dir, width }) => cli::normalize(&dir, width),
        None => sleepscreen::terminal::run(config, 8),
    }
}

fn init_logging(to_file: bool) {
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=sleepscreen=trace
    let writer = if to_file {
        match open_log_file() {
            Some(file) => BoxMakeWriter::new(std::sync::Mutex::new(file)),
            None => BoxMakeWriter::new(std::io::sink),
        }
    } else {
        BoxMakeWriter::new(std::io::stderr)
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .with_ansi(!to_file)
        .with_writer(writer)
        .init();
}

fn open_log_file() -> Option<std::fs::File> {
    let dir = dirs::cache_dir()?.join("sleepscreen");
    std::fs::create_dir_all(&dir).ok()?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("sleepscreen.log"))
        .ok()
}
