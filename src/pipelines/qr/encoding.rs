// SPDX-License-Identifier: GPL-3.0-only

//! QR rendering with the qrcode crate

use super::{CorrectionLevel, ModuleGrid, QrEncoder, RenderOptions, RenderedCode};
use crate::constants::preview::QUIET_ZONE_MODULES;
use crate::errors::{EncodeError, ExportError};
use image::RgbaImage;
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode};
use tracing::debug;

/// Encoder producing [`QrcodeRendered`] instances
#[derive(Debug, Default, Clone, Copy)]
pub struct QrcodeEncoder;

impl QrEncoder for QrcodeEncoder {
    fn create(
        &self,
        text: &str,
        options: &RenderOptions,
    ) -> Result<Box<dyn RenderedCode>, EncodeError> {
        let (modules, image) = render(text, options)?;
        Ok(Box::new(QrcodeRendered {
            options: options.clone(),
            text: text.to_string(),
            modules,
            image,
        }))
    }
}

/// A rendered symbol and the options it was drawn with
pub struct QrcodeRendered {
    options: RenderOptions,
    text: String,
    modules: ModuleGrid,
    image: RgbaImage,
}

impl RenderedCode for QrcodeRendered {
    fn regenerate(&mut self, text: &str) -> Result<(), EncodeError> {
        let (modules, image) = render(text, &self.options)?;
        self.text = text.to_string();
        self.modules = modules;
        self.image = image;
        Ok(())
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn image(&self) -> &RgbaImage {
        &self.image
    }

    fn modules(&self) -> &ModuleGrid {
        &self.modules
    }
}

fn ec_level(level: CorrectionLevel) -> EcLevel {
    match level {
        CorrectionLevel::Low => EcLevel::L,
        CorrectionLevel::Medium => EcLevel::M,
        CorrectionLevel::Quartile => EcLevel::Q,
        CorrectionLevel::High => EcLevel::H,
    }
}

/// Encode `text` and draw it
///
/// Modules are drawn at an integer scale so every module has crisp edges.
/// The symbol is centred on a light square canvas of `options.size` pixels,
/// or larger when the symbol does not fit at one pixel per module.
fn render(text: &str, options: &RenderOptions) -> Result<(ModuleGrid, RgbaImage), EncodeError> {
    let level = ec_level(options.correction_level);
    let code = QrCode::with_error_correction_level(text.as_bytes(), level).map_err(|e| match e {
        QrError::DataTooLong => EncodeError::DataTooLong,
        other => EncodeError::Failed(other.to_string()),
    })?;

    let width = code.width();
    let dark: Vec<bool> = code
        .to_colors()
        .into_iter()
        .map(|c| c == qrcode::Color::Dark)
        .collect();
    let modules = ModuleGrid::new(width, dark);

    let total = width as u32 + 2 * QUIET_ZONE_MODULES;
    let scale = (options.size / total).max(1);
    let rendered = total * scale;
    let canvas = options.size.max(rendered);
    let offset = (canvas - rendered) / 2 + QUIET_ZONE_MODULES * scale;

    let mut image = RgbaImage::from_pixel(canvas, canvas, options.light.to_rgba());
    let dark_px = options.dark.to_rgba();
    for my in 0..width {
        for mx in 0..width {
            if !modules.is_dark(mx as isize, my as isize) {
                continue;
            }
            let x0 = offset + mx as u32 * scale;
            let y0 = offset + my as u32 * scale;
            for y in y0..y0 + scale {
                for x in x0..x0 + scale {
                    image.put_pixel(x, y, dark_px);
                }
            }
        }
    }

    debug!(
        version_modules = width,
        scale,
        size = canvas,
        len = text.len(),
        "Rendered QR code"
    );
    Ok((modules, image))
}

/// Encode an image as PNG
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut buffer = Vec::new();

    image
        .write_to(
            &mut std::io::Cursor::new(&mut buffer),
            image::ImageFormat::Png,
        )
        .map_err(|e| ExportError::EncodingFailed(format!("PNG encoding failed: {}", e)))?;

    Ok(buffer)
}
