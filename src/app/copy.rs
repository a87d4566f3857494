// SPDX-License-Identifier: GPL-3.0-only

//! Copy-to-clipboard action with a transient confirmation

use super::frame_processor::ScanResult;
use super::timers::RevertTimer;
use crate::backends::clipboard::Clipboard;
use crate::errors::ClipboardError;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub struct CopyAction {
    feedback: RevertTimer,
}

impl CopyAction {
    pub fn new(feedback: Duration) -> Self {
        Self {
            feedback: RevertTimer::new(feedback),
        }
    }

    /// Copy the scan payload and show the confirmation
    ///
    /// On failure the confirmation is left as it was.
    pub fn copy(
        &mut self,
        clipboard: &mut dyn Clipboard,
        result: Option<&ScanResult>,
        now: Instant,
    ) -> Result<(), ClipboardError> {
        let Some(result) = result else {
            return Err(ClipboardError::NothingToCopy);
        };

        match clipboard.write_text(&result.payload) {
            Ok(()) => {
                self.feedback.trigger(now);
                info!(len = result.payload.len(), "Scan result copied");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to copy scan result");
                Err(e)
            }
        }
    }

    /// Whether the "Copied!" label is showing
    pub fn is_confirming(&self, now: Instant) -> bool {
        self.feedback.is_active(now)
    }

    /// Returns true when the confirmation reverts
    pub fn poll(&mut self, now: Instant) -> bool {
        self.feedback.poll(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MemoryClipboard {
        text: Option<String>,
        fail: bool,
    }

    impl Clipboard for MemoryClipboard {
        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::Denied("not focused".into()));
            }
            self.text = Some(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_copy_confirms_then_reverts() {
        let now = Instant::now();
        let mut clipboard = MemoryClipboard::default();
        let mut action = CopyAction::new(Duration::from_millis(1500));
        let result = ScanResult::new("HELLO");

        action.copy(&mut clipboard, Some(&result), now).unwrap();
        assert_eq!(clipboard.text.as_deref(), Some("HELLO"));
        assert!(action.is_confirming(now + Duration::from_millis(1000)));
        assert!(action.poll(now + Duration::from_millis(1500)));
        assert!(!action.is_confirming(now + Duration::from_millis(1500)));
    }

    #[test]
    fn test_failed_copy_shows_nothing() {
        let now = Instant::now();
        let mut clipboard = MemoryClipboard {
            fail: true,
            ..MemoryClipboard::default()
        };
        let mut action = CopyAction::new(Duration::from_millis(2000));
        let result = ScanResult::new("HELLO");

        assert!(action.copy(&mut clipboard, Some(&result), now).is_err());
        assert!(!action.is_confirming(now));
    }

    #[test]
    fn test_nothing_to_copy() {
        let mut clipboard = MemoryClipboard::default();
        let mut action = CopyAction::new(Duration::from_millis(1500));
        assert_eq!(
            action.copy(&mut clipboard, None, Instant::now()),
            Err(ClipboardError::NothingToCopy)
        );
        assert!(clipboard.text.is_none());
    }
}
