// SPDX-License-Identifier: GPL-3.0-only

//! QR code generation
//!
//! An encoder creates a [`RenderedCode`] instance for some text. The instance
//! is kept for the lifetime of the generate view and regenerated in place
//! when the text changes; the same text always yields the same image.

pub mod encoding;

pub use encoding::{QrcodeEncoder, encode_png};

use crate::errors::{EncodeError, ExportError};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Error correction level of generated symbols
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionLevel {
    Low,
    Medium,
    Quartile,
    /// Recovers ~30% damage
    #[default]
    High,
}

/// 8-bit sRGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Parse `#rrggbb` (the `#` is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.0, self.1, self.2, 255])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Minimum width and height of the image in pixels
    pub size: u32,
    pub dark: Rgb,
    pub light: Rgb,
    pub correction_level: CorrectionLevel,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            size: crate::constants::preview::STANDARD_SIZE,
            dark: Rgb::BLACK,
            light: Rgb::WHITE,
            correction_level: CorrectionLevel::High,
        }
    }
}

/// Module matrix of a symbol, without quiet zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGrid {
    width: usize,
    dark: Vec<bool>,
}

impl ModuleGrid {
    pub fn new(width: usize, dark: Vec<bool>) -> Self {
        Self { width, dark }
    }

    /// Modules per side
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether a module is dark; coordinates outside the symbol are light
    pub fn is_dark(&self, x: isize, y: isize) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.width {
            return false;
        }
        self.dark[y as usize * self.width + x as usize]
    }
}

/// Creates rendered codes
pub trait QrEncoder {
    fn create(
        &self,
        text: &str,
        options: &RenderOptions,
    ) -> Result<Box<dyn RenderedCode>, EncodeError>;
}

/// A generated code that can be regenerated in place
pub trait RenderedCode {
    /// Re-render with new text, keeping the options
    ///
    /// On error the previous rendering is kept.
    fn regenerate(&mut self, text: &str) -> Result<(), EncodeError>;

    /// Text currently encoded
    fn text(&self) -> &str;

    fn image(&self) -> &RgbaImage;

    fn modules(&self) -> &ModuleGrid;

    fn to_png(&self) -> Result<Vec<u8>, ExportError> {
        encode_png(self.image())
    }
}
