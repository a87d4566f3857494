// SPDX-License-Identifier: GPL-3.0-only

//! Generate mode controller
//!
//! Typed text is debounced, trimmed and rendered through the encoder. The
//! rendered code instance is created on first use and regenerated in place
//! afterwards; clearing the input only hides the image.

use super::timers::Debouncer;
use crate::errors::{EncodeError, ExportError};
use crate::pipelines::qr::{ModuleGrid, QrEncoder, RenderOptions, RenderedCode};
use crate::storage::FileSaver;
use image::RgbaImage;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// First code rendered by a new encoder instance
    Generated,
    /// Existing instance re-rendered with new text
    Regenerated,
    /// Input was empty; the image was hidden and download disabled
    Cleared,
}

/// The code currently offered for download
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedCode {
    pub source_text: String,
    pub image: RgbaImage,
}

pub struct GenerationController {
    encoder: Box<dyn QrEncoder>,
    options: RenderOptions,
    instance: Option<Box<dyn RenderedCode>>,
    generated: Option<GeneratedCode>,
    debounce: Debouncer<String>,
    file_name: String,
    generations: u64,
}

impl GenerationController {
    pub fn new(
        encoder: Box<dyn QrEncoder>,
        options: RenderOptions,
        debounce: Duration,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            encoder,
            options,
            instance: None,
            generated: None,
            debounce: Debouncer::new(debounce),
            file_name: file_name.into(),
            generations: 0,
        }
    }

    /// Record an input change; generation happens once the input settles
    pub fn on_input_changed(&mut self, text: &str, now: Instant) {
        self.debounce.trigger(text.to_string(), now);
    }

    /// Generate from settled input, if any
    pub fn poll(&mut self, now: Instant) -> Option<Result<GenerateOutcome, EncodeError>> {
        let text = self.debounce.poll(now)?;
        Some(self.generate(&text))
    }

    /// Whether typed input is waiting for the debounce window
    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Drop input still waiting for the debounce window
    pub fn cancel_pending(&mut self) {
        self.debounce.cancel();
    }

    /// Render `text` immediately
    pub fn generate(&mut self, text: &str) -> Result<GenerateOutcome, EncodeError> {
        let text = text.trim();
        if text.is_empty() {
            if self.generated.take().is_some() {
                debug!("Input cleared, hiding generated code");
            }
            return Ok(GenerateOutcome::Cleared);
        }

        let outcome = match self.instance.as_mut() {
            Some(instance) => instance.regenerate(text).map(|_| GenerateOutcome::Regenerated),
            None => self.encoder.create(text, &self.options).map(|instance| {
                self.instance = Some(instance);
                GenerateOutcome::Generated
            }),
        };

        match outcome {
            Ok(outcome) => {
                if let Some(instance) = &self.instance {
                    self.generated = Some(GeneratedCode {
                        source_text: instance.text().to_string(),
                        image: instance.image().clone(),
                    });
                }
                self.generations += 1;
                debug!(?outcome, len = text.len(), "Generated QR code");
                Ok(outcome)
            }
            Err(e) => {
                warn!(error = %e, len = text.len(), "QR generation failed");
                self.generated = None;
                Err(e)
            }
        }
    }

    /// Generate `seed` if no code was ever rendered
    ///
    /// Returns whether the seed was generated.
    pub fn seed_default(&mut self, seed: &str) -> bool {
        if self.instance.is_some() || self.debounce.is_pending() {
            return false;
        }
        match self.generate(seed) {
            Ok(GenerateOutcome::Cleared) | Err(_) => false,
            Ok(_) => true,
        }
    }

    /// Write the current code as PNG
    ///
    /// `Ok(None)` means there was nothing to download.
    pub fn download(&self, saver: &dyn FileSaver) -> Result<Option<PathBuf>, ExportError> {
        let Some(generated) = &self.generated else {
            debug!("Download requested without a generated code");
            return Ok(None);
        };

        let png = crate::pipelines::qr::encode_png(&generated.image)?;
        let path = saver.save(&png, &self.file_name)?;
        info!(path = %path.display(), "Downloaded QR code");
        Ok(Some(path))
    }

    pub fn current(&self) -> Option<&GeneratedCode> {
        self.generated.as_ref()
    }

    /// Module matrix of the shown code
    pub fn modules(&self) -> Option<&ModuleGrid> {
        self.generated.as_ref()?;
        self.instance.as_ref().map(|i| i.modules())
    }

    pub fn is_download_enabled(&self) -> bool {
        self.generated.is_some()
    }

    /// Successful generations so far
    pub fn generations(&self) -> u64 {
        self.generations
    }
}
