// SPDX-License-Identifier: GPL-3.0-only

//! Capture thread ownership
//!
//! A camera track reads its device on a dedicated thread. The
//! [`CaptureLoopController`] owns that thread: stopping or dropping it raises
//! the [`StopSignal`] and joins, so a stopped track never publishes another
//! frame into its slot.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Flag shared between a controller and its capture thread
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Owner of one capture thread
///
/// ```ignore
/// let mut capture = CaptureLoopController::spawn("v4l2-capture", move |stop| {
///     while !stop.is_stopped() {
///         slot.publish(next_frame());
///     }
/// });
/// capture.stop();
/// ```
pub struct CaptureLoopController {
    label: String,
    signal: StopSignal,
    thread: Option<JoinHandle<()>>,
}

impl CaptureLoopController {
    /// Run `body` on a named thread
    ///
    /// The body owns the device for the lifetime of the thread and must
    /// return soon after the signal is raised.
    pub fn spawn<F>(label: &str, body: F) -> Self
    where
        F: FnOnce(StopSignal) + Send + 'static,
    {
        let signal = StopSignal::default();
        let thread_signal = signal.clone();
        let thread_label = label.to_string();

        let thread = thread::Builder::new()
            .name(label.to_string())
            .spawn(move || {
                debug!(thread = %thread_label, "Capture thread running");
                body(thread_signal);
                debug!(thread = %thread_label, "Capture thread returned");
            })
            .map_err(|e| warn!(thread = %label, error = %e, "Could not spawn capture thread"))
            .ok();

        if thread.is_some() {
            info!(thread = %label, "Capture thread spawned");
        }

        Self {
            label: label.to_string(),
            signal,
            thread,
        }
    }

    /// Whether the thread exists and has not returned yet
    pub fn is_running(&self) -> bool {
        matches!(&self.thread, Some(handle) if !handle.is_finished())
    }

    /// Raise the stop signal without waiting
    pub fn request_stop(&self) {
        self.signal.raise();
    }

    /// Raise the stop signal and join the thread
    pub fn stop(&mut self) {
        self.request_stop();
        let Some(handle) = self.thread.take() else {
            return;
        };
        match handle.join() {
            Ok(()) => debug!(thread = %self.label, "Capture thread joined"),
            Err(_) => warn!(thread = %self.label, "Capture thread panicked"),
        }
    }
}

impl Drop for CaptureLoopController {
    fn drop(&mut self) {
        self.stop();
    }
}
