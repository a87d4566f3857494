// SPDX-License-Identifier: GPL-3.0-only
//! Pixel format conversion for captured frames
//!
//! Capture threads convert whatever the device produces into tightly packed
//! RGBA before publishing a frame. Each converter returns `None` when the
//! buffer is shorter than the format requires.

use super::types::{PixelFormat, packed_len};

/// Convert a captured buffer to packed RGBA
///
/// `stride` is the device-reported bytes per row (0 means tightly packed).
pub fn to_rgba(
    format: PixelFormat,
    data: &[u8],
    width: u32,
    height: u32,
    stride: u32,
) -> Option<Vec<u8>> {
    match format {
        PixelFormat::Rgba => repack(data, width, height, stride, 4, |px, out| {
            out.extend_from_slice(&px[..4]);
        }),
        PixelFormat::Rgb24 => repack(data, width, height, stride, 3, |px, out| {
            out.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }),
        PixelFormat::Gray8 => repack(data, width, height, stride, 1, |px, out| {
            out.extend_from_slice(&[px[0], px[0], px[0], 255]);
        }),
        PixelFormat::Yuyv => yuyv_to_rgba(data, width, height, stride),
        PixelFormat::Mjpeg => mjpeg_to_rgba(data, width, height),
    }
}

/// Copy rows of an uncompressed format, dropping stride padding
fn repack<F>(
    data: &[u8],
    width: u32,
    height: u32,
    stride: u32,
    bytes_per_pixel: usize,
    mut write_pixel: F,
) -> Option<Vec<u8>>
where
    F: FnMut(&[u8], &mut Vec<u8>),
{
    let width = width as usize;
    let height = height as usize;
    let row_bytes = width.checked_mul(bytes_per_pixel)?;
    let stride = if stride == 0 { row_bytes } else { stride as usize };

    if stride < row_bytes || data.len() < packed_len(stride, height, row_bytes)? {
        return None;
    }

    let mut rgba = Vec::with_capacity(width.checked_mul(height)?.checked_mul(4)?);
    for y in 0..height {
        let row = &data[y * stride..y * stride + row_bytes];
        for px in row.chunks_exact(bytes_per_pixel) {
            write_pixel(px, &mut rgba);
        }
    }
    Some(rgba)
}

/// Convert YUYV (YUV 4:2:2) to RGBA
///
/// YUYV format: Y0 U0 Y1 V0 - each 4-byte group encodes 2 pixels.
/// Uses BT.601 coefficients for YUV to RGB conversion.
pub fn yuyv_to_rgba(data: &[u8], width: u32, height: u32, stride: u32) -> Option<Vec<u8>> {
    let width = width as usize;
    let height = height as usize;
    let row_bytes = width.checked_mul(2)?;
    let stride = if stride == 0 { row_bytes } else { stride as usize };

    if width % 2 != 0 || data.len() < packed_len(stride, height, row_bytes)? {
        return None;
    }

    let mut rgba = Vec::with_capacity(width.checked_mul(height)?.checked_mul(4)?);
    for y in 0..height {
        let row = &data[y * stride..y * stride + row_bytes];
        for chunk in row.chunks_exact(4) {
            let u = chunk[1] as f32 - 128.0;
            let v = chunk[3] as f32 - 128.0;
            for luma in [chunk[0], chunk[2]] {
                let (r, g, b) = yuv_to_rgb(luma as f32, u, v);
                rgba.extend_from_slice(&[r, g, b, 255]);
            }
        }
    }
    Some(rgba)
}

/// Decode one MJPEG frame to RGBA
///
/// Frames whose decoded size differs from the negotiated one are rejected.
pub fn mjpeg_to_rgba(data: &[u8], width: u32, height: u32) -> Option<Vec<u8>> {
    let decoded = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg).ok()?;
    let rgba = decoded.to_rgba8();
    if rgba.width() != width || rgba.height() != height {
        return None;
    }
    Some(rgba.into_raw())
}

/// Convert YUV (BT.601) to RGB, with chroma already centred on zero
fn yuv_to_rgb(y: f32, u: f32, v: f32) -> (u8, u8, u8) {
    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344136 * u - 0.714136 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;
    (r, g, b)
}

/// Luma of an RGBA pixel (BT.601 weights, integer arithmetic)
pub fn rgba_luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuyv_grey_maps_to_grey() {
        // Two pixels with neutral chroma
        let data = [100, 128, 200, 128];
        let rgba = yuyv_to_rgba(&data, 2, 1, 0).unwrap();
        assert_eq!(rgba, vec![100, 100, 100, 255, 200, 200, 200, 255]);
    }

    #[test]
    fn test_rgb24_with_stride_padding() {
        let data: Vec<u8> = vec![
            255, 0, 0, // red
            0, 255, 0, // green
            9, 9, // padding
            0, 0, 255, // blue
            1, 2, 3, // dark
            9, 9, // padding
        ];
        let rgba = to_rgba(PixelFormat::Rgb24, &data, 2, 2, 8).unwrap();
        assert_eq!(rgba.len(), 16);
        assert_eq!(&rgba[0..4], &[255, 0, 0, 255]);
        assert_eq!(&rgba[8..12], &[0, 0, 255, 255]);
        assert_eq!(&rgba[12..16], &[1, 2, 3, 255]);
    }

    #[test]
    fn test_short_buffer_rejected() {
        assert!(to_rgba(PixelFormat::Gray8, &[0; 3], 2, 2, 0).is_none());
        assert!(yuyv_to_rgba(&[0; 6], 2, 2, 0).is_none());
    }

    #[test]
    fn test_unaddressable_header_rejected() {
        assert!(to_rgba(PixelFormat::Rgb24, &[0; 12], u32::MAX, u32::MAX, 0).is_none());
        assert!(yuyv_to_rgba(&[0; 8], u32::MAX - 1, u32::MAX, u32::MAX).is_none());
    }

    #[test]
    fn test_mjpeg_round_trip() {
        let image = image::RgbImage::from_pixel(8, 8, image::Rgb([200, 200, 200]));
        let mut jpeg = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
            .unwrap();

        let rgba = mjpeg_to_rgba(&jpeg, 8, 8).unwrap();
        assert_eq!(rgba.len(), 8 * 8 * 4);
        assert!(mjpeg_to_rgba(&jpeg, 16, 16).is_none());
    }

    #[test]
    fn test_luma_extremes() {
        assert_eq!(rgba_luma(0, 0, 0), 0);
        assert_eq!(rgba_luma(255, 255, 255), 255);
    }
}
