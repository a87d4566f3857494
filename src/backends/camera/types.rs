// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Which way the camera should face
///
/// Phones and tablets expose both; laptops usually only have a user-facing
/// camera, in which case the preference falls back to whatever exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear camera, pointing away from the user
    #[default]
    Environment,
    /// Front camera, pointing at the user
    User,
}

impl FacingMode {
    /// Guess the facing of a device from its name
    ///
    /// V4L2 has no facing property, so this relies on naming conventions
    /// used by phone sensors and laptop webcams.
    pub fn from_device_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        const ENVIRONMENT: [&str; 4] = ["back", "rear", "world", "environment"];
        const USER: [&str; 5] = ["front", "user", "face", "integrated", "webcam"];

        if ENVIRONMENT.iter().any(|hint| name.contains(hint)) {
            Some(FacingMode::Environment)
        } else if USER.iter().any(|hint| name.contains(hint)) {
            Some(FacingMode::User)
        } else {
            None
        }
    }
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FacingMode::Environment => write!(f, "environment"),
            FacingMode::User => write!(f, "user"),
        }
    }
}

/// Represents a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub name: String,
    /// Path to capture device (e.g. /dev/video0)
    pub path: String,
    /// Facing inferred from the device name, if any
    pub facing: Option<FacingMode>,
}

/// What a caller asks for when opening a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConstraints {
    pub facing: FacingMode,
    /// Explicit device path; overrides the facing preference
    pub device: Option<String>,
    pub width: u32,
    pub height: u32,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            facing: FacingMode::Environment,
            device: None,
            width: crate::constants::CAPTURE_WIDTH,
            height: crate::constants::CAPTURE_HEIGHT,
        }
    }
}

/// Pixel formats negotiated with capture devices
///
/// Every format is converted to RGBA on the capture thread before a frame is
/// published, so consumers only ever see RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// RGBA - 32-bit with alpha (4 bytes per pixel)
    Rgba,
    /// RGB24 - 24-bit RGB (3 bytes per pixel, no alpha)
    Rgb24,
    /// Gray8 - 8-bit grayscale (single channel)
    Gray8,
    /// YUYV - Packed 4:2:2 (Y0 U Y1 V interleaved)
    Yuyv,
    /// Motion JPEG, one JPEG image per frame
    Mjpeg,
}

impl PixelFormat {
    /// Parse a V4L2 FourCC code
    pub fn from_fourcc(fourcc: &[u8; 4]) -> Option<Self> {
        match fourcc {
            b"AB24" | b"RGBA" => Some(Self::Rgba),
            b"RGB3" => Some(Self::Rgb24),
            b"GREY" => Some(Self::Gray8),
            b"YUYV" => Some(Self::Yuyv),
            b"MJPG" | b"JPEG" => Some(Self::Mjpeg),
            _ => None,
        }
    }
}

/// A single RGBA frame from the camera
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// RGBA pixels, `stride` bytes per row
    pub data: Arc<[u8]>,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// Monotonic frame counter of the producing stream
    pub sequence: u64,
    /// Timestamp when frame was captured
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Build a tightly packed RGBA frame
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>, sequence: u64) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data),
            stride: width.saturating_mul(4),
            sequence,
            captured_at: Instant::now(),
        }
    }

    /// Wrap an RGBA image, e.g. a generated code for display
    pub fn from_image(image: &image::RgbaImage) -> Self {
        Self::from_rgba(image.width(), image.height(), image.as_raw().clone(), 0)
    }

    /// Whether the buffer holds every row the header promises
    pub fn is_complete(&self) -> bool {
        let Some(row_bytes) = (self.width as usize).checked_mul(4) else {
            return false;
        };
        let stride = self.stride as usize;
        self.width > 0
            && self.height > 0
            && stride >= row_bytes
            && packed_len(stride, self.height as usize, row_bytes)
                .is_some_and(|needed| self.data.len() >= needed)
    }
}

/// Bytes in a tightly packed RGBA image, `None` if it cannot be addressed
pub fn rgba_len(width: u32, height: u32) -> Option<usize> {
    (width as usize).checked_mul(height as usize)?.checked_mul(4)
}

/// Bytes needed for `height` rows of `row_bytes`, each starting `stride` apart
pub fn packed_len(stride: usize, height: usize, row_bytes: usize) -> Option<usize> {
    stride.checked_mul(height.saturating_sub(1))?.checked_add(row_bytes)
}

/// Readiness of a frame source, mirroring a video element's ready state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// No frame has been delivered yet
    HaveNothing,
    /// A complete frame is available
    HaveEnoughData,
}

/// Latest-frame slot shared between a capture thread and its readers
///
/// The producer overwrites the slot on every frame; readers take a cheap
/// clone of whatever frame is current.
#[derive(Debug, Clone, Default)]
pub struct FrameSlot {
    inner: Arc<Mutex<Option<CameraFrame>>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current frame
    pub fn publish(&self, frame: CameraFrame) {
        *self.lock() = Some(frame);
    }

    /// Current frame, if a complete one is available
    pub fn latest(&self) -> Option<CameraFrame> {
        self.lock().as_ref().filter(|f| f.is_complete()).cloned()
    }

    pub fn ready_state(&self) -> ReadyState {
        match self.lock().as_ref() {
            Some(frame) if frame.is_complete() => ReadyState::HaveEnoughData,
            _ => ReadyState::HaveNothing,
        }
    }

    /// Drop the current frame
    pub fn clear(&self) {
        *self.lock() = None;
    }

    fn lock(&self) -> MutexGuard<'_, Option<CameraFrame>> {
        // A panicking producer leaves a valid Option behind
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
