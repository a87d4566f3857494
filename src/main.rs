// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use qrcam::config::{Config, Profile};
use qrcam::constants::APP_DIR_NAME;
use std::path::PathBuf;
use std::sync::Mutex;

mod cli;

#[derive(Parser)]
#[command(name = "qrcam")]
#[command(about = "Scan QR codes with a camera or generate them from text")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    /// Preset bundle (code size, seed payload, start behaviour)
    #[arg(short, long, global = true, value_enum)]
    profile: Option<Profile>,

    /// Camera device path (e.g. /dev/video2)
    #[arg(short, long, global = true)]
    camera: Option<String>,

    /// Config file (default: ~/.config/qrcam/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available cameras
    List,

    /// Scan a QR code and print its content
    Scan {
        /// Scan an image file instead of a camera
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Also copy the result to the clipboard
        #[arg(long)]
        copy: bool,
    },

    /// Generate a QR code PNG
    Generate {
        /// Text or URL to encode
        text: String,

        /// Output file path (default: ~/Downloads/QR Codes/qrcode.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Image size in pixels
        #[arg(short, long)]
        size: Option<u32>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.command.is_none());

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    if let Some(profile) = cli.profile {
        config = config.with_profile(profile);
    }
    if let Some(camera) = cli.camera {
        config.camera_device = Some(camera);
    }

    match cli.command {
        Some(Commands::List) => cli::list_cameras(),
        Some(Commands::Scan { image, copy }) => cli::scan(&config, image, copy),
        Some(Commands::Generate { text, output, size }) => {
            cli::generate(&config, &text, output, size)
        }
        None => qrcam::terminal::run(config),
    }
}

/// Initialize logging
///
/// Set RUST_LOG environment variable to control log level
/// Examples: RUST_LOG=debug, RUST_LOG=qrcam=debug, RUST_LOG=info
///
/// The terminal page owns the screen, so it logs to
/// `~/.cache/qrcam/qrcam.log` instead of stderr.
fn init_logging(terminal_page: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let log_file = terminal_page
        .then(|| {
            let dir = dirs::cache_dir()?.join(APP_DIR_NAME);
            std::fs::create_dir_all(&dir).ok()?;
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("qrcam.log"))
                .ok()
        })
        .flatten();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true);

    match log_file {
        Some(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).init(),
        None if terminal_page => builder.with_writer(std::io::sink).init(),
        None => builder.with_writer(std::io::stderr).init(),
    }
}
