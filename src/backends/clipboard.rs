// SPDX-License-Identifier: GPL-3.0-only

//! System clipboard access

use crate::errors::ClipboardError;
use tracing::{debug, warn};

/// Destination for copied text
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard backed by the desktop session
///
/// The arboard handle is created on first use and kept alive afterwards: on
/// X11 the copied text is only served while its owner exists.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> Result<&mut arboard::Clipboard, ClipboardError> {
        if self.inner.is_none() {
            let clipboard = arboard::Clipboard::new().map_err(map_error)?;
            self.inner = Some(clipboard);
        }
        self.inner
            .as_mut()
            .ok_or_else(|| ClipboardError::Unavailable("clipboard not initialized".into()))
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let result = self.handle()?.set_text(text.to_string());
        match result {
            Ok(()) => {
                debug!(len = text.len(), "Copied text to clipboard");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Clipboard write failed");
                // A broken handle is recreated on the next attempt
                self.inner = None;
                Err(map_error(e))
            }
        }
    }
}

fn map_error(e: arboard::Error) -> ClipboardError {
    match e {
        arboard::Error::ClipboardNotSupported => {
            ClipboardError::Unavailable("no clipboard in this session".into())
        }
        other => ClipboardError::Denied(other.to_string()),
    }
}
