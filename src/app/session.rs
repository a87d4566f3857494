// SPDX-License-Identifier: GPL-3.0-only

//! Camera stream lifecycle
//!
//! The session exclusively owns at most one live stream. It attaches the
//! stream's frame slot to the preview surface while active and releases the
//! device on stop, on drop, or when the owning view goes away.

use crate::backends::camera::{
    CameraBackend, CameraFrame, FrameSlot, MediaStream, StreamConstraints,
};
use crate::errors::CameraError;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

/// Where the live preview is shown
///
/// Cloned handles observe the same attachment, so the renderer can hold one
/// while the session attaches and detaches streams.
#[derive(Debug, Clone, Default)]
pub struct PreviewSurface {
    source: Arc<Mutex<Option<FrameSlot>>>,
}

impl PreviewSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, slot: FrameSlot) {
        *self.lock() = Some(slot);
    }

    pub fn detach(&self) {
        *self.lock() = None;
    }

    pub fn is_attached(&self) -> bool {
        self.lock().is_some()
    }

    /// Frame to display, if a stream is attached and has delivered one
    pub fn current_frame(&self) -> Option<CameraFrame> {
        self.lock().as_ref().and_then(|slot| slot.latest())
    }

    fn lock(&self) -> MutexGuard<'_, Option<FrameSlot>> {
        self.source.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub struct CaptureSession {
    backend: Box<dyn CameraBackend>,
    constraints: StreamConstraints,
    stream: Option<MediaStream>,
    preview: PreviewSurface,
}

impl CaptureSession {
    pub fn new(
        backend: Box<dyn CameraBackend>,
        constraints: StreamConstraints,
        preview: PreviewSurface,
    ) -> Self {
        Self {
            backend,
            constraints,
            stream: None,
            preview,
        }
    }

    /// Acquire a stream and attach it to the preview
    ///
    /// A session that is already active keeps its stream.
    pub fn start(&mut self) -> Result<(), CameraError> {
        if self.stream.is_some() {
            return Ok(());
        }

        info!(
            backend = self.backend.name(),
            facing = %self.constraints.facing,
            "Requesting camera stream"
        );
        let stream = self.backend.open(&self.constraints).map_err(|e| {
            warn!(error = %e, "Camera unavailable");
            e
        })?;

        self.preview.attach(stream.video().clone());
        self.stream = Some(stream);
        Ok(())
    }

    /// Stop every track and detach the preview
    ///
    /// Returns whether a stream was released.
    pub fn stop(&mut self) -> bool {
        let Some(mut stream) = self.stream.take() else {
            return false;
        };
        let stopped = stream.stop_all();
        self.preview.detach();
        info!(tracks = stopped, "Camera stream released");
        true
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Whether the active stream still delivers frames
    pub fn is_live(&self) -> bool {
        self.stream.as_ref().map(|s| s.is_live()).unwrap_or(false)
    }

    /// Frame slot the scan loop samples from
    pub fn frame_source(&self) -> Option<&FrameSlot> {
        self.stream.as_ref().map(|s| s.video())
    }

    pub fn preview(&self) -> &PreviewSurface {
        &self.preview
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::StillImageBackend;

    fn session() -> CaptureSession {
        let image = image::RgbaImage::from_pixel(8, 8, image::Rgba([255, 255, 255, 255]));
        CaptureSession::new(
            Box::new(StillImageBackend::from_image(image)),
            StreamConstraints::default(),
            PreviewSurface::new(),
        )
    }

    #[test]
    fn test_start_attaches_preview() {
        let mut session = session();
        session.start().unwrap();

        assert!(session.is_active());
        assert!(session.is_live());
        assert!(session.preview().is_attached());
        assert!(session.preview().current_frame().is_some());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut session = session();
        assert!(!session.stop());

        session.start().unwrap();
        assert!(session.stop());
        assert!(!session.stop());
        assert!(!session.is_active());
        assert!(!session.preview().is_attached());
        assert!(session.frame_source().is_none());
    }

    #[test]
    fn test_failed_start_stays_inactive() {
        let mut session = CaptureSession::new(
            Box::new(StillImageBackend::from_path("/nonexistent.png")),
            StreamConstraints::default(),
            PreviewSurface::new(),
        );
        assert_eq!(session.start(), Err(CameraError::NoCameraFound));
        assert!(!session.is_active());
        assert!(!session.preview().is_attached());
    }
}
