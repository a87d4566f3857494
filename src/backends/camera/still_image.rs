// SPDX-License-Identifier: GPL-3.0-only

//! Still image camera
//!
//! Presents a single image file as a camera that always shows the same frame.
//! Used for scanning codes from screenshots and by tests.

use super::types::*;
use super::{CameraBackend, MediaStream, MediaTrack};
use crate::constants::file_formats;
use crate::errors::CameraError;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Backend serving one image as a camera
#[derive(Debug, Clone)]
pub struct StillImageBackend {
    label: String,
    source: StillSource,
}

#[derive(Debug, Clone)]
enum StillSource {
    File(PathBuf),
    Image(RgbaImage),
}

impl StillImageBackend {
    /// Serve an image file; it is decoded each time the camera opens
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            label: path.display().to_string(),
            source: StillSource::File(path),
        }
    }

    /// Serve an in-memory image
    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            label: "still image".to_string(),
            source: StillSource::Image(image),
        }
    }

    fn load(&self) -> Result<RgbaImage, CameraError> {
        match &self.source {
            StillSource::Image(image) => Ok(image.clone()),
            StillSource::File(path) => load_image(path),
        }
    }
}

fn load_image(path: &Path) -> Result<RgbaImage, CameraError> {
    if !path.exists() {
        return Err(CameraError::NoCameraFound);
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !file_formats::is_image_extension(&ext) {
        return Err(CameraError::InvalidFormat(format!(
            "{} is not a supported image",
            path.display()
        )));
    }

    let image = image::open(path)
        .map_err(|e| CameraError::InvalidFormat(format!("{}: {}", path.display(), e)))?;
    debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "Loaded still image"
    );
    Ok(image.to_rgba8())
}

impl CameraBackend for StillImageBackend {
    fn name(&self) -> &str {
        "still-image"
    }

    fn enumerate(&self) -> Vec<CameraDevice> {
        vec![CameraDevice {
            name: self.label.clone(),
            path: self.label.clone(),
            facing: None,
        }]
    }

    fn open(&mut self, _constraints: &StreamConstraints) -> Result<MediaStream, CameraError> {
        let image = self.load()?;
        let slot = FrameSlot::new();
        slot.publish(CameraFrame::from_image(&image));

        info!(source = %self.label, "Still image camera opened");
        let track = StillTrack {
            label: self.label.clone(),
            slot: slot.clone(),
            live: true,
        };
        Ok(MediaStream::new(vec![Box::new(track)], slot))
    }
}

/// Track that keeps one frame published until stopped
struct StillTrack {
    label: String,
    slot: FrameSlot,
    live: bool,
}

impl MediaTrack for StillTrack {
    fn label(&self) -> &str {
        &self.label
    }

    fn is_live(&self) -> bool {
        self.live
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.slot.clear();
            debug!(track = %self.label, "Still image track stopped");
        }
    }
}
