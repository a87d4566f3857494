// SPDX-License-Identifier: GPL-3.0-only

//! QR code decoding
//!
//! This module implements QR code decoding using the rqrr crate.
//! Frames are optionally downscaled, converted to grayscale and searched for
//! QR grids; the first grid that decodes wins.

use super::QrDecoder;
use crate::app::frame_processor::types::{DecodeOptions, DecodedCode};
use crate::backends::camera::format_converters::rgba_luma;
use crate::backends::camera::types::rgba_len;
use tracing::{debug, trace};

/// QR decoder backed by rqrr
///
/// Large frames are shrunk to `max_dimension` before the grid search.
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoder;

impl RqrrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl QrDecoder for RqrrDecoder {
    fn decode(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        options: &DecodeOptions,
    ) -> Option<DecodedCode> {
        let needed = rgba_len(width, height)?;
        if width == 0 || height == 0 || pixels.len() < needed {
            return None;
        }
        let start = std::time::Instant::now();

        let luma = to_luma(pixels);
        let (luma, proc_width, proc_height) = match options.max_dimension {
            Some(max_dim) if width > max_dim || height > max_dim => {
                let scale = (width as f32 / max_dim as f32).max(height as f32 / max_dim as f32);
                let new_width = ((width as f32 / scale) as u32).max(1);
                let new_height = ((height as f32 / scale) as u32).max(1);
                let shrunk = shrink_luma(&luma, width, height, new_width, new_height);
                (shrunk, new_width, new_height)
            }
            _ => (luma, width, height),
        };

        trace!(
            proc_width,
            proc_height,
            conversion_ms = start.elapsed().as_millis(),
            "Prepared grayscale image"
        );

        for &inverted in options.inversion.polarities() {
            if let Some(payload) = decode_luma(&luma, proc_width, proc_height, inverted) {
                debug!(
                    len = payload.len(),
                    inverted,
                    total_ms = start.elapsed().as_millis(),
                    "Decoded QR code"
                );
                return Some(DecodedCode { payload });
            }
        }
        None
    }
}

fn decode_luma(luma: &[u8], width: u32, height: u32, inverted: bool) -> Option<String> {
    let stride = width as usize;
    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
            let value = luma[y * stride + x];
            if inverted { 255 - value } else { value }
        });

    let grids = prepared.detect_grids();
    trace!(count = grids.len(), inverted, "QR grids detected");

    grids.into_iter().find_map(|grid| match grid.decode() {
        Ok((_meta, content)) => Some(content),
        Err(e) => {
            debug!(error = %e, "Failed to decode QR grid");
            None
        }
    })
}

fn to_luma(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .map(|px| rgba_luma(px[0], px[1], px[2]))
        .collect()
}

/// Shrink a grayscale image, averaging the source block behind each pixel
fn shrink_luma(luma: &[u8], width: u32, height: u32, out_width: u32, out_height: u32) -> Vec<u8> {
    let (w, h) = (width as usize, height as usize);
    let (ow, oh) = (out_width as usize, out_height as usize);
    let mut out = Vec::with_capacity(ow * oh);

    for oy in 0..oh {
        let y0 = oy * h / oh;
        let y1 = ((oy + 1) * h / oh).max(y0 + 1);
        for ox in 0..ow {
            let x0 = ox * w / ow;
            let x1 = ((ox + 1) * w / ow).max(x0 + 1);

            let mut sum = 0u32;
            for row in luma[y0 * w..y1 * w].chunks_exact(w) {
                sum += row[x0..x1].iter().map(|&v| v as u32).sum::<u32>();
            }
            out.push((sum / ((x1 - x0) * (y1 - y0)) as u32) as u8);
        }
    }
    out
}
