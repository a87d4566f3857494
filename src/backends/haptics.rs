// SPDX-License-Identifier: GPL-3.0-only

//! Success feedback
//!
//! Terminals have no vibration motor; the bell is the closest thing. Hosts
//! without a terminal get no feedback at all.

use std::io::{IsTerminal, Write};
use std::time::Duration;
use tracing::debug;

pub trait Haptics {
    /// Whether a pulse would be noticeable
    fn is_supported(&self) -> bool;

    /// Emit one pulse; ignored when unsupported
    fn pulse(&mut self, duration: Duration);
}

/// Rings the terminal bell
#[derive(Debug, Default)]
pub struct TerminalBell;

impl Haptics for TerminalBell {
    fn is_supported(&self) -> bool {
        std::io::stdout().is_terminal()
    }

    fn pulse(&mut self, duration: Duration) {
        if !self.is_supported() {
            return;
        }
        let mut stdout = std::io::stdout();
        if stdout.write_all(b"\x07").and_then(|_| stdout.flush()).is_ok() {
            debug!(duration_ms = duration.as_millis() as u64, "Haptic pulse");
        }
    }
}

/// No feedback
#[derive(Debug, Default)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn is_supported(&self) -> bool {
        false
    }

    fn pulse(&mut self, _duration: Duration) {}
}
