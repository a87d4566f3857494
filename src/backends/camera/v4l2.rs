// SPDX-License-Identifier: GPL-3.0-only

//! Direct V4L2 capture
//!
//! Devices are opened and streamed on a dedicated capture thread. `open`
//! waits for that thread to negotiate a format and start streaming, so a
//! busy or unsupported device is reported synchronously. Every buffer is
//! converted to RGBA and published into the stream's frame slot.

use super::format_converters;
use super::frame_loop::{CaptureLoopController, StopSignal};
use super::types::*;
use super::{CameraBackend, MediaStream, MediaTrack, select_device};
use crate::constants::{CAPTURE_BUFFERS, PREFERRED_FOURCCS};
use crate::errors::CameraError;
use std::path::Path;
use std::sync::mpsc::{self, SyncSender};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};
use v4l::buffer::Type;
use v4l::capability::Flags;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::{Format, FourCC};

/// How long `open` waits for the capture thread to start streaming
const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Consecutive capture errors tolerated before the track gives up
const MAX_CONSECUTIVE_ERRORS: u32 = 30;

/// Longest a dequeue may block, so a stalled device cannot delay `stop`
const DEQUEUE_TIMEOUT: Duration = Duration::from_millis(200);

/// What the capture loop does after a failed dequeue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureVerdict {
    /// No buffer within the dequeue timeout; check the stop signal again
    Stalled,
    /// Transient failure, try the next buffer
    Retry,
    /// Too many failures in a row
    GiveUp,
}

/// Counts consecutive dequeue failures, ignoring timeouts
#[derive(Debug, Default)]
struct ErrorBudget {
    consecutive: u32,
}

impl ErrorBudget {
    fn record(&mut self, error: &std::io::Error) -> CaptureVerdict {
        if error.kind() == std::io::ErrorKind::TimedOut {
            return CaptureVerdict::Stalled;
        }
        self.consecutive += 1;
        if self.consecutive >= MAX_CONSECUTIVE_ERRORS {
            CaptureVerdict::GiveUp
        } else {
            CaptureVerdict::Retry
        }
    }

    fn reset(&mut self) {
        self.consecutive = 0;
    }
}

/// Format the capture thread settled on
#[derive(Debug, Clone, Copy)]
struct Negotiated {
    format: PixelFormat,
    width: u32,
    height: u32,
    stride: u32,
}

/// V4L2 camera backend
#[derive(Debug, Default)]
pub struct V4l2Backend;

impl V4l2Backend {
    pub fn new() -> Self {
        Self
    }
}

impl CameraBackend for V4l2Backend {
    fn name(&self) -> &str {
        "v4l2"
    }

    fn enumerate(&self) -> Vec<CameraDevice> {
        let mut paths: Vec<_> = std::fs::read_dir("/dev")
            .into_iter()
            .flatten()
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with("video"))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        let cameras: Vec<CameraDevice> = paths
            .iter()
            .filter_map(|path| probe_device(path))
            .collect();

        debug!(count = cameras.len(), "Enumerated V4L2 capture devices");
        cameras
    }

    fn open(&mut self, constraints: &StreamConstraints) -> Result<MediaStream, CameraError> {
        let devices = self.enumerate();
        let device = match select_device(&devices, constraints) {
            Some(device) => device.clone(),
            // An explicit path that does not enumerate (e.g. a loopback node) is
            // still worth trying
            None => match &constraints.device {
                Some(path) => CameraDevice {
                    name: path.clone(),
                    path: path.clone(),
                    facing: None,
                },
                None => return Err(CameraError::NoCameraFound),
            },
        };

        let slot = FrameSlot::new();
        let track = V4l2Track::start(&device, constraints, slot.clone())?;
        Ok(MediaStream::new(vec![Box::new(track)], slot))
    }
}

/// Query a device node, keeping it only if it can capture video
fn probe_device(path: &Path) -> Option<CameraDevice> {
    let dev = Device::with_path(path).ok()?;
    let caps = dev.query_caps().ok()?;
    if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
        return None;
    }

    let device = CameraDevice {
        facing: FacingMode::from_device_name(&caps.card),
        name: caps.card.clone(),
        path: path.to_string_lossy().to_string(),
    };
    debug!(name = %device.name, path = %device.path, driver = %caps.driver, "Found capture device");
    Some(device)
}

/// Live V4L2 video track
pub struct V4l2Track {
    label: String,
    controller: Option<CaptureLoopController>,
}

impl V4l2Track {
    /// Spawn the capture thread and wait until it streams
    fn start(
        device: &CameraDevice,
        constraints: &StreamConstraints,
        slot: FrameSlot,
    ) -> Result<Self, CameraError> {
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let path = device.path.clone();
        let (width, height) = (constraints.width, constraints.height);

        info!(path = %path, width, height, "Opening V4L2 device");

        let mut controller = CaptureLoopController::spawn("v4l2-capture", move |stop| {
            capture_loop(&path, width, height, slot, ready_tx, stop);
        });

        match ready_rx.recv_timeout(STARTUP_TIMEOUT) {
            Ok(Ok(negotiated)) => {
                info!(
                    name = %device.name,
                    format = ?negotiated.format,
                    width = negotiated.width,
                    height = negotiated.height,
                    "V4L2 stream started"
                );
                Ok(Self {
                    label: device.name.clone(),
                    controller: Some(controller),
                })
            }
            Ok(Err(e)) => {
                controller.stop();
                Err(e)
            }
            Err(_) => {
                controller.stop();
                Err(CameraError::InitializationFailed(format!(
                    "{} did not start streaming",
                    device.path
                )))
            }
        }
    }
}

impl MediaTrack for V4l2Track {
    fn label(&self) -> &str {
        &self.label
    }

    fn is_live(&self) -> bool {
        self.controller
            .as_ref()
            .map(|c| c.is_running())
            .unwrap_or(false)
    }

    fn stop(&mut self) {
        if let Some(mut controller) = self.controller.take() {
            controller.stop();
            info!(track = %self.label, "V4L2 track stopped");
        }
    }
}

/// Try the preferred formats in order, returning the first the driver accepts
fn negotiate(dev: &Device, width: u32, height: u32) -> Result<Negotiated, CameraError> {
    for fourcc in PREFERRED_FOURCCS {
        let requested = Format::new(width, height, FourCC::new(fourcc));
        let actual = match dev.set_format(&requested) {
            Ok(actual) => actual,
            Err(e) => {
                debug!(fourcc = ?requested.fourcc, error = %e, "Format rejected");
                continue;
            }
        };

        // Drivers answer with their closest match, which may be another format
        if let Some(format) = PixelFormat::from_fourcc(&actual.fourcc.repr) {
            return Ok(Negotiated {
                format,
                width: actual.width,
                height: actual.height,
                stride: actual.stride,
            });
        }
        debug!(fourcc = ?actual.fourcc, "Driver offered unsupported format");
    }

    Err(CameraError::InvalidFormat(
        "device offers none of YUYV, MJPG, RGB3, GREY".to_string(),
    ))
}

fn capture_loop(
    path: &str,
    width: u32,
    height: u32,
    slot: FrameSlot,
    ready: SyncSender<Result<Negotiated, CameraError>>,
    stop: StopSignal,
) {
    let dev = match Device::with_path(path) {
        Ok(dev) => dev,
        Err(e) => {
            let _ = ready.send(Err(CameraError::from(e)));
            return;
        }
    };

    let negotiated = match negotiate(&dev, width, height) {
        Ok(negotiated) => negotiated,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    let mut stream = match MmapStream::with_buffers(&dev, Type::VideoCapture, CAPTURE_BUFFERS) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready.send(Err(CameraError::from(e)));
            return;
        }
    };

    stream.set_timeout(DEQUEUE_TIMEOUT);

    if ready.send(Ok(negotiated)).is_err() {
        // open() already gave up on us
        return;
    }

    let mut sequence = 0u64;
    let mut errors = ErrorBudget::default();

    while !stop.is_stopped() {
        let frame_start = Instant::now();
        let (buf, meta) = match stream.next() {
            Ok(frame) => frame,
            Err(e) => match errors.record(&e) {
                CaptureVerdict::Stalled => {
                    trace!(path, "No buffer within the dequeue timeout");
                    continue;
                }
                CaptureVerdict::Retry => {
                    warn!(
                        error = %e,
                        consecutive_errors = errors.consecutive,
                        "Failed to capture frame"
                    );
                    std::thread::sleep(Duration::from_millis(10));
                    continue;
                }
                CaptureVerdict::GiveUp => {
                    error!(path, error = %e, "Too many capture errors, ending stream");
                    break;
                }
            },
        };
        errors.reset();

        // bytesused is 0 for drivers that do not report it
        let used = match meta.bytesused as usize {
            0 => buf.len(),
            n => n.min(buf.len()),
        };

        let Some(rgba) = format_converters::to_rgba(
            negotiated.format,
            &buf[..used],
            negotiated.width,
            negotiated.height,
            negotiated.stride,
        ) else {
            debug!(size = used, "Dropping incomplete frame");
            continue;
        };

        let mut frame = CameraFrame::from_rgba(negotiated.width, negotiated.height, rgba, sequence);
        frame.captured_at = frame_start;
        slot.publish(frame);

        if sequence % 120 == 0 {
            debug!(
                sequence,
                driver_sequence = meta.sequence,
                elapsed_us = frame_start.elapsed().as_micros(),
                "Frame captured"
            );
        }
        sequence += 1;
    }

    slot.clear();
    info!(path, "V4L2 capture loop ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_timeouts_never_exhaust_the_budget() {
        let mut errors = ErrorBudget::default();
        let timeout = Error::from(ErrorKind::TimedOut);
        for _ in 0..MAX_CONSECUTIVE_ERRORS * 2 {
            assert_eq!(errors.record(&timeout), CaptureVerdict::Stalled);
        }
        assert_eq!(errors.consecutive, 0);
    }

    #[test]
    fn test_repeated_failures_give_up() {
        let mut errors = ErrorBudget::default();
        let failure = Error::other("VIDIOC_DQBUF");
        for _ in 1..MAX_CONSECUTIVE_ERRORS {
            assert_eq!(errors.record(&failure), CaptureVerdict::Retry);
        }
        assert_eq!(errors.record(&failure), CaptureVerdict::GiveUp);
    }

    #[test]
    fn test_frame_resets_the_budget() {
        let mut errors = ErrorBudget::default();
        let failure = Error::other("VIDIOC_DQBUF");
        for _ in 1..MAX_CONSECUTIVE_ERRORS {
            errors.record(&failure);
        }
        errors.reset();
        assert_eq!(errors.record(&failure), CaptureVerdict::Retry);
    }

    #[test]
    fn test_dequeue_timeout_is_short() {
        assert!(DEQUEUE_TIMEOUT < STARTUP_TIMEOUT);
    }
}
