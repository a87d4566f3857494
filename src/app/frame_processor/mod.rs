// SPDX-License-Identifier: GPL-3.0-only

//! Frame processor: the cooperative scan loop
//!
//! The loop is driven from the UI thread, one [`ScanLoop::tick`] per display
//! refresh. Each tick samples the latest camera frame into an off-screen
//! buffer and runs one decode. The loop ends when a code is found or its
//! [`ScanHandle`] is cancelled.
//!
//! ```text
//! Idle ──start──► Running ──decode ok──► Found
//!                    │
//!                    └──cancel──► Cancelled
//! ```

pub mod tasks;
pub mod types;

pub use tasks::{QrDecoder, RqrrDecoder};
pub use types::{DecodeOptions, DecodedCode, FrameBuffer, InversionAttempts, ScanResult};

use crate::backends::camera::types::{FrameSlot, ReadyState};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// Frames larger than this are downscaled before decoding
pub const DEFAULT_MAX_DIMENSION: u32 = 640;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Running,
    Found,
    Cancelled,
}

/// Cancellation handle of one scan run
///
/// Once cancelled, no later tick of that run samples a frame.
#[derive(Debug)]
pub struct ScanHandle {
    cancelled: Arc<AtomicBool>,
}

impl ScanHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The loop is not running
    Idle,
    /// No complete frame yet
    Waiting,
    /// A frame was decoded without finding a code
    Missed,
    /// A code was found; the loop has stopped
    Found(String),
    /// The run was cancelled; the loop has stopped
    Cancelled,
}

pub struct ScanLoop {
    state: ScanState,
    token: Option<Arc<AtomicBool>>,
    buffer: FrameBuffer,
    options: DecodeOptions,
    ticks: u64,
    decode_attempts: u64,
}

impl ScanLoop {
    pub fn new(options: DecodeOptions) -> Self {
        Self {
            state: ScanState::Idle,
            token: None,
            buffer: FrameBuffer::new(),
            options,
            ticks: 0,
            decode_attempts: 0,
        }
    }

    /// Begin a new run, cancelling any previous one
    pub fn start(&mut self) -> ScanHandle {
        if let Some(previous) = self.token.take() {
            previous.store(true, Ordering::SeqCst);
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        self.token = Some(Arc::clone(&cancelled));
        self.state = ScanState::Running;
        self.ticks = 0;
        self.decode_attempts = 0;
        debug!("Scan loop started");

        ScanHandle { cancelled }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Whether another tick is expected
    pub fn is_scheduled(&self) -> bool {
        self.state == ScanState::Running
    }

    pub fn tick(&mut self, source: &FrameSlot, decoder: &dyn QrDecoder) -> TickOutcome {
        if self.state != ScanState::Running {
            return TickOutcome::Idle;
        }

        let cancelled = self
            .token
            .as_ref()
            .map(|t| t.load(Ordering::SeqCst))
            .unwrap_or(true);
        if cancelled {
            self.state = ScanState::Cancelled;
            self.token = None;
            debug!(ticks = self.ticks, attempts = self.decode_attempts, "Scan loop cancelled");
            return TickOutcome::Cancelled;
        }

        self.ticks += 1;

        if source.ready_state() != ReadyState::HaveEnoughData {
            return TickOutcome::Waiting;
        }
        let Some(frame) = source.latest() else {
            return TickOutcome::Waiting;
        };

        self.buffer.draw(&frame);
        self.decode_attempts += 1;

        match decoder.decode(
            self.buffer.pixels(),
            self.buffer.width(),
            self.buffer.height(),
            &self.options,
        ) {
            Some(code) => {
                self.state = ScanState::Found;
                self.token = None;
                debug!(
                    ticks = self.ticks,
                    attempts = self.decode_attempts,
                    sequence = frame.sequence,
                    "Scan loop found a code"
                );
                TickOutcome::Found(code.payload)
            }
            None => {
                trace!(sequence = frame.sequence, "No code in frame");
                TickOutcome::Missed
            }
        }
    }
}
