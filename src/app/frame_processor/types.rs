// SPDX-License-Identifier: GPL-3.0-only

//! Core types for frame scanning

use crate::backends::camera::types::CameraFrame;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Payload decoded from a camera frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub payload: String,
    pub captured_at: DateTime<Local>,
}

impl ScanResult {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            captured_at: Local::now(),
        }
    }
}

/// What the decoder found in one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCode {
    pub payload: String,
}

/// Which polarities the decoder tries
///
/// Printed codes are dark on light; `DontInvert` only looks for those.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InversionAttempts {
    #[default]
    DontInvert,
    OnlyInvert,
    AttemptBoth,
    InvertFirst,
}

impl InversionAttempts {
    /// Polarities to try in order (`true` = inverted)
    pub fn polarities(&self) -> &'static [bool] {
        match self {
            Self::DontInvert => &[false],
            Self::OnlyInvert => &[true],
            Self::AttemptBoth => &[false, true],
            Self::InvertFirst => &[true, false],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    pub inversion: InversionAttempts,
    /// Frames larger than this are downscaled before decoding
    pub max_dimension: Option<u32>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            inversion: InversionAttempts::DontInvert,
            max_dimension: Some(super::DEFAULT_MAX_DIMENSION),
        }
    }
}

/// Off-screen RGBA buffer frames are drawn into before decoding
///
/// Sized to each frame's native resolution; the allocation is reused while
/// the resolution stays the same.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy a frame in, dropping stride padding
    pub fn draw(&mut self, frame: &CameraFrame) {
        let width = frame.width as usize;
        let height = frame.height as usize;
        let stride = frame.stride as usize;
        let row_bytes = width * 4;

        self.width = frame.width;
        self.height = frame.height;
        self.pixels.clear();
        self.pixels.reserve(row_bytes * height);

        for y in 0..height {
            let row_start = y * stride;
            let row_end = row_start + row_bytes;
            if row_end <= frame.data.len() {
                self.pixels.extend_from_slice(&frame.data[row_start..row_end]);
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed RGBA pixels
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_draw_strips_stride() {
        let data: Vec<u8> = vec![
            255, 0, 0, 255, // Red pixel
            0, 255, 0, 255, // Green pixel
            0, 0, // stride padding
            0, 0, 255, 255, // Blue pixel
            255, 255, 255, 255, // White pixel
            0, 0, // stride padding
        ];
        let frame = CameraFrame {
            width: 2,
            height: 2,
            data: Arc::from(data.as_slice()),
            stride: 10,
            sequence: 0,
            captured_at: std::time::Instant::now(),
        };

        let mut buffer = FrameBuffer::new();
        buffer.draw(&frame);

        assert_eq!((buffer.width(), buffer.height()), (2, 2));
        assert_eq!(buffer.pixels().len(), 16);
        assert_eq!(&buffer.pixels()[8..12], &[0, 0, 255, 255]);
        assert_eq!(&buffer.pixels()[12..16], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_buffer_follows_frame_resolution() {
        let mut buffer = FrameBuffer::new();
        buffer.draw(&CameraFrame::from_rgba(4, 4, vec![0; 64], 0));
        buffer.draw(&CameraFrame::from_rgba(2, 1, vec![7; 8], 1));
        assert_eq!((buffer.width(), buffer.height()), (2, 1));
        assert_eq!(buffer.pixels(), &[7; 8]);
    }

    #[test]
    fn test_inversion_order() {
        assert_eq!(InversionAttempts::DontInvert.polarities(), &[false]);
        assert_eq!(InversionAttempts::InvertFirst.polarities(), &[true, false]);
    }

    #[test]
    fn test_inversion_serde_names() {
        let parsed: InversionAttempts = serde_json::from_str("\"dontInvert\"").unwrap();
        assert_eq!(parsed, InversionAttempts::DontInvert);
        let parsed: InversionAttempts = serde_json::from_str("\"attemptBoth\"").unwrap();
        assert_eq!(parsed, InversionAttempts::AttemptBoth);
    }
}
