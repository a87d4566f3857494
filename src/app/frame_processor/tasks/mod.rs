// SPDX-License-Identifier: GPL-3.0-only

//! Frame analysis tasks
//!
//! The scan loop hands each sampled frame to a [`QrDecoder`]. Decoders are
//! stateless: a miss is `None`, never an error.

pub mod qr_detector;

pub use qr_detector::RqrrDecoder;

use super::types::{DecodeOptions, DecodedCode};

pub trait QrDecoder {
    /// Decode the first QR code found in a packed RGBA image
    fn decode(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        options: &DecodeOptions,
    ) -> Option<DecodedCode>;
}
