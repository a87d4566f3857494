// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! A backend enumerates devices and opens a [`MediaStream`]: a set of live
//! tracks plus the [`FrameSlot`] the video track publishes into. Stopping the
//! stream stops every track, which releases the device.
//!
//! ```text
//! CameraBackend::open ──► MediaStream ─┬─ tracks (V4l2Track, StillTrack)
//!                                      └─ FrameSlot ◄── capture thread
//! ```

pub mod format_converters;
pub mod frame_loop;
pub mod still_image;
pub mod types;
pub mod v4l2;

pub use still_image::StillImageBackend;
pub use types::*;
pub use v4l2::V4l2Backend;

use crate::errors::CameraError;
use tracing::{debug, info};

/// One live source inside a stream
pub trait MediaTrack: Send {
    /// Human readable label (usually the device name)
    fn label(&self) -> &str;

    /// Whether the track still delivers frames
    fn is_live(&self) -> bool;

    /// Stop the track and release its device
    ///
    /// Must be idempotent.
    fn stop(&mut self);
}

/// An open camera stream
pub struct MediaStream {
    tracks: Vec<Box<dyn MediaTrack>>,
    video: FrameSlot,
}

impl MediaStream {
    pub fn new(tracks: Vec<Box<dyn MediaTrack>>, video: FrameSlot) -> Self {
        Self { tracks, video }
    }

    /// Slot holding the latest video frame
    pub fn video(&self) -> &FrameSlot {
        &self.video
    }

    /// Stop every track, returning how many were still live
    pub fn stop_all(&mut self) -> usize {
        let mut stopped = 0;
        for track in &mut self.tracks {
            if track.is_live() {
                debug!(track = track.label(), "Stopping track");
                stopped += 1;
            }
            track.stop();
        }
        self.video.clear();
        stopped
    }

    /// Whether any track is still live
    pub fn is_live(&self) -> bool {
        self.tracks.iter().any(|t| t.is_live())
    }
}

impl Drop for MediaStream {
    fn drop(&mut self) {
        self.stop_all();
    }
}

/// Source of camera streams
pub trait CameraBackend: Send {
    /// Backend name for logging
    fn name(&self) -> &str;

    /// List available capture devices
    fn enumerate(&self) -> Vec<CameraDevice>;

    /// Open a stream matching the constraints
    fn open(&mut self, constraints: &StreamConstraints) -> Result<MediaStream, CameraError>;
}

/// Pick the device that best matches the constraints
///
/// An explicit device path wins, then a device facing the requested way, then
/// whatever device is first.
pub fn select_device<'a>(
    devices: &'a [CameraDevice],
    constraints: &StreamConstraints,
) -> Option<&'a CameraDevice> {
    if let Some(path) = &constraints.device {
        return devices.iter().find(|d| &d.path == path);
    }

    let selected = devices
        .iter()
        .find(|d| d.facing == Some(constraints.facing))
        .or_else(|| devices.first());

    if let Some(device) = selected {
        info!(
            name = %device.name,
            path = %device.path,
            facing = %constraints.facing,
            "Selected camera"
        );
    }
    selected
}
