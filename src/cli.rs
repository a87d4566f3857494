// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Scanning a QR code without the terminal page
//! - Generating a QR code to a PNG file

use qrcam::app::frame_processor::{DecodeOptions, RqrrDecoder, ScanLoop, TickOutcome};
use qrcam::app::{CaptureSession, PreviewSurface, Scanner};
use qrcam::backends::camera::{
    CameraBackend, StillImageBackend, StreamConstraints, V4l2Backend,
};
use qrcam::backends::clipboard::{Clipboard, SystemClipboard};
use qrcam::backends::haptics::NoHaptics;
use qrcam::config::Config;
use qrcam::constants::{TICK_INTERVAL, preview::QUIET_ZONE_MODULES};
use qrcam::pipelines::qr::{ModuleGrid, QrEncoder, QrcodeEncoder};
use qrcam::storage::{DirectorySaver, FileSaver};
use std::path::PathBuf;
use tokio::time::MissedTickBehavior;

type ScanError = Box<dyn std::error::Error>;

/// List all available cameras
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    let cameras = V4l2Backend::new().enumerate();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera.name);
        let facing = camera
            .facing
            .map(|f| f.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!("      Path: {}  Facing: {}", camera.path, facing);
        println!();
    }

    Ok(())
}

/// Scan until a code is found or Ctrl+C is pressed
pub fn scan(
    config: &Config,
    image: Option<PathBuf>,
    copy: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend: Box<dyn CameraBackend> = match image {
        Some(path) => Box::new(StillImageBackend::from_path(path)),
        None => Box::new(V4l2Backend::new()),
    };
    let constraints = StreamConstraints {
        facing: config.facing_mode,
        device: config.camera_device.clone(),
        ..StreamConstraints::default()
    };
    let session = CaptureSession::new(backend, constraints, PreviewSurface::new());
    let scan_loop = ScanLoop::new(DecodeOptions {
        inversion: config.inversion,
        max_dimension: config.max_decode_dimension,
    });
    let mut scanner = Scanner::new(
        session,
        scan_loop,
        Box::new(RqrrDecoder::new()),
        Box::new(NoHaptics),
        None,
    );

    scanner.start()?;
    eprintln!("Scanning... (Ctrl+C to cancel)");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let payload: Option<String> = runtime.block_on(async {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = interval.tick() => match scanner.tick() {
                    TickOutcome::Found(payload) => break Ok::<_, ScanError>(Some(payload)),
                    TickOutcome::Cancelled | TickOutcome::Idle => {
                        let reason = match scanner.status() {
                            qrcam::app::ScanStatus::CameraUnavailable(message) => message.clone(),
                            _ => "Scan ended".to_string(),
                        };
                        break Err(reason.into());
                    }
                    TickOutcome::Waiting | TickOutcome::Missed => {}
                },
                _ = &mut ctrl_c => {
                    scanner.stop();
                    eprintln!("Cancelled.");
                    break Ok(None);
                }
            }
        }
    })?;

    let Some(payload) = payload else {
        return Ok(());
    };
    println!("{}", payload);

    if copy {
        let mut clipboard = SystemClipboard::new();
        clipboard.write_text(&payload)?;
        eprintln!("Copied to clipboard.");
    }
    Ok(())
}

/// Generate a QR code PNG and print it to the terminal
pub fn generate(
    config: &Config,
    text: &str,
    output: Option<PathBuf>,
    size: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = text.trim();
    if text.is_empty() {
        return Err("Please enter text or a URL.".into());
    }

    let mut options = config.render_options();
    if let Some(size) = size {
        options.size = size.max(1);
    }

    let code = QrcodeEncoder.create(text, &options)?;
    let png = code.to_png()?;

    let path = match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &png)?;
            path
        }
        None => DirectorySaver::new(config.download_dir()).save(&png, &config.download_file_name)?,
    };

    print!("{}", render_half_blocks(code.modules()));
    println!("Saved: {}", path.display());
    Ok(())
}

/// Draw a module grid with half-block characters
///
/// Light modules are drawn as filled blocks, which suits dark terminals.
fn render_half_blocks(modules: &ModuleGrid) -> String {
    let quiet = QUIET_ZONE_MODULES as isize;
    let side = modules.width() as isize + 2 * quiet;
    let mut out = String::new();

    for row in (0..side).step_by(2) {
        for col in 0..side {
            let top = !modules.is_dark(col - quiet, row - quiet);
            let bottom = row + 1 < side && !modules.is_dark(col - quiet, row + 1 - quiet);
            out.push(match (top, bottom) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_blocks_shape() {
        let grid = ModuleGrid::new(1, vec![true]);
        let rendered = render_half_blocks(&grid);
        let lines: Vec<&str> = rendered.lines().collect();

        // 1 module + 8 quiet modules = 9 columns, 5 rows
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l.chars().count() == 9));
        // Row pair 4/5 holds the dark module on top at column 4
        assert_eq!(lines[2].chars().nth(4), Some('▄'));
        assert_eq!(lines[2].chars().nth(0), Some('█'));
    }
}
