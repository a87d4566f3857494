// SPDX-License-Identifier: GPL-3.0-only

//! Scan mode controller
//!
//! Ties the capture session, the scan loop and the result together. A found
//! code releases the camera immediately; the user starts a new scan to read
//! another one.

use super::frame_processor::{QrDecoder, ScanHandle, ScanLoop, ScanResult, TickOutcome};
use super::session::CaptureSession;
use crate::backends::haptics::Haptics;
use crate::errors::CameraError;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What the scan region shows besides the preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    Inactive,
    Scanning,
    /// The camera could not be opened or went away
    CameraUnavailable(String),
    Found,
}

pub struct Scanner {
    session: CaptureSession,
    scan_loop: ScanLoop,
    handle: Option<ScanHandle>,
    decoder: Box<dyn QrDecoder>,
    haptics: Box<dyn Haptics>,
    haptic_pulse: Option<Duration>,
    result: Option<ScanResult>,
    result_visible: bool,
    status: ScanStatus,
}

impl Scanner {
    pub fn new(
        session: CaptureSession,
        scan_loop: ScanLoop,
        decoder: Box<dyn QrDecoder>,
        haptics: Box<dyn Haptics>,
        haptic_pulse: Option<Duration>,
    ) -> Self {
        Self {
            session,
            scan_loop,
            handle: None,
            decoder,
            haptics,
            haptic_pulse,
            result: None,
            result_visible: false,
            status: ScanStatus::Inactive,
        }
    }

    /// Open the camera and begin sampling frames
    pub fn start(&mut self) -> Result<(), CameraError> {
        if self.is_scanning() {
            return Ok(());
        }

        self.result_visible = false;
        if let Err(e) = self.session.start() {
            warn!(error = %e, "Could not start scanning");
            self.status = ScanStatus::CameraUnavailable(e.to_string());
            return Err(e);
        }

        self.handle = Some(self.scan_loop.start());
        self.status = ScanStatus::Scanning;
        info!("Scanning started");
        Ok(())
    }

    /// Cancel sampling, then release the camera
    ///
    /// Returns whether a camera stream was released.
    pub fn stop(&mut self) -> bool {
        if let Some(handle) = self.handle.take() {
            handle.cancel();
        }
        let released = self.session.stop();
        if self.status == ScanStatus::Scanning {
            self.status = ScanStatus::Inactive;
        }
        if released {
            info!("Scanning stopped");
        }
        released
    }

    pub fn toggle(&mut self) -> Result<(), CameraError> {
        if self.is_scanning() {
            self.stop();
            Ok(())
        } else {
            self.start()
        }
    }

    /// Run one scan loop tick
    pub fn tick(&mut self) -> TickOutcome {
        if !self.session.is_active() {
            return TickOutcome::Idle;
        }

        if !self.session.is_live() {
            warn!("Camera stream ended unexpectedly");
            self.stop();
            self.status = ScanStatus::CameraUnavailable(CameraError::Disconnected.to_string());
            return TickOutcome::Cancelled;
        }

        let Some(source) = self.session.frame_source() else {
            return TickOutcome::Idle;
        };
        let outcome = self.scan_loop.tick(source, self.decoder.as_ref());

        match &outcome {
            TickOutcome::Found(payload) => {
                self.result = Some(ScanResult::new(payload.clone()));
                self.handle = None;
                self.session.stop();
                self.result_visible = true;
                self.status = ScanStatus::Found;

                if let Some(pulse) = self.haptic_pulse {
                    if self.haptics.is_supported() {
                        self.haptics.pulse(pulse);
                    }
                }
                info!(len = payload.len(), "QR code scanned");
            }
            TickOutcome::Cancelled => {
                debug!("Scan tick observed cancellation");
            }
            _ => {}
        }
        outcome
    }

    pub fn is_scanning(&self) -> bool {
        self.session.is_active() && self.scan_loop.is_scheduled()
    }

    /// Latest result, even if hidden
    pub fn result(&self) -> Option<&ScanResult> {
        self.result.as_ref()
    }

    /// Result to display; hidden while a new scan runs
    pub fn visible_result(&self) -> Option<&ScanResult> {
        self.result.as_ref().filter(|_| self.result_visible)
    }

    pub fn status(&self) -> &ScanStatus {
        &self.status
    }

    pub fn session(&self) -> &CaptureSession {
        &self.session
    }
}
