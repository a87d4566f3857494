// SPDX-License-Identifier: GPL-3.0-only

//! Fakes shared by the integration tests

#![allow(dead_code)]

use image::RgbaImage;
use qrcam::app::AppDependencies;
use qrcam::app::frame_processor::RqrrDecoder;
use qrcam::backends::camera::{
    CameraBackend, CameraDevice, CameraFrame, FrameSlot, MediaStream, MediaTrack,
    StreamConstraints,
};
use qrcam::backends::clipboard::Clipboard;
use qrcam::backends::haptics::Haptics;
use qrcam::errors::{CameraError, ClipboardError, ExportError};
use qrcam::pipelines::qr::{QrEncoder, QrcodeEncoder, RenderOptions};
use qrcam::storage::FileSaver;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Counters observed by tests after the fakes moved into the app
#[derive(Clone, Default)]
pub struct Probe {
    pub opens: Arc<AtomicUsize>,
    pub stops: Arc<AtomicUsize>,
    pub pulses: Arc<AtomicUsize>,
    pub clipboard: Arc<Mutex<Option<String>>>,
    pub saved: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    pub unplugged: Arc<AtomicBool>,
}

impl Probe {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn pulses(&self) -> usize {
        self.pulses.load(Ordering::SeqCst)
    }

    pub fn clipboard(&self) -> Option<String> {
        self.clipboard.lock().unwrap().clone()
    }

    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().unwrap().clone()
    }

    /// Make every open track report that its device went away
    pub fn unplug(&self) {
        self.unplugged.store(true, Ordering::SeqCst);
    }
}

/// Camera that shows a fixed image, or fails to open
pub struct FakeCamera {
    pub frame: Option<RgbaImage>,
    pub error: Option<CameraError>,
    pub probe: Probe,
}

impl CameraBackend for FakeCamera {
    fn name(&self) -> &str {
        "fake"
    }

    fn enumerate(&self) -> Vec<CameraDevice> {
        vec![CameraDevice {
            name: "Fake Rear Camera".to_string(),
            path: "/dev/fake0".to_string(),
            facing: None,
        }]
    }

    fn open(&mut self, _constraints: &StreamConstraints) -> Result<MediaStream, CameraError> {
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        self.probe.opens.fetch_add(1, Ordering::SeqCst);

        let slot = FrameSlot::new();
        if let Some(image) = &self.frame {
            slot.publish(CameraFrame::from_image(image));
        }
        let track = FakeTrack {
            live: true,
            stops: Arc::clone(&self.probe.stops),
            unplugged: Arc::clone(&self.probe.unplugged),
        };
        Ok(MediaStream::new(vec![Box::new(track)], slot))
    }
}

struct FakeTrack {
    live: bool,
    stops: Arc<AtomicUsize>,
    unplugged: Arc<AtomicBool>,
}

impl MediaTrack for FakeTrack {
    fn label(&self) -> &str {
        "fake"
    }

    fn is_live(&self) -> bool {
        self.live && !self.unplugged.load(Ordering::SeqCst)
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub struct MemoryClipboard(pub Probe);

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        *self.0.clipboard.lock().unwrap() = Some(text.to_string());
        Ok(())
    }
}

pub struct MemorySaver(pub Probe);

impl FileSaver for MemorySaver {
    fn save(&self, bytes: &[u8], file_name: &str) -> Result<PathBuf, ExportError> {
        self.0
            .saved
            .lock()
            .unwrap()
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(PathBuf::from("/memory").join(file_name))
    }
}

pub struct CountingHaptics(pub Probe);

impl Haptics for CountingHaptics {
    fn is_supported(&self) -> bool {
        true
    }

    fn pulse(&mut self, duration: Duration) {
        assert_eq!(duration, Duration::from_millis(200));
        self.0.pulses.fetch_add(1, Ordering::SeqCst);
    }
}

/// A 320x240 white frame with a QR code for `text` in the middle
pub fn frame_with_code(text: &str) -> RgbaImage {
    let options = RenderOptions {
        size: 200,
        ..RenderOptions::default()
    };
    let code = QrcodeEncoder.create(text, &options).unwrap();
    let mut frame = RgbaImage::from_pixel(320, 240, image::Rgba([255, 255, 255, 255]));
    let x = (320 - code.image().width() as i64) / 2;
    let y = (240 - code.image().height() as i64) / 2;
    image::imageops::overlay(&mut frame, code.image(), x, y);
    frame
}

/// A 320x240 white frame
pub fn blank_frame() -> RgbaImage {
    RgbaImage::from_pixel(320, 240, image::Rgba([255, 255, 255, 255]))
}

pub fn camera_showing(frame: Option<RgbaImage>, probe: &Probe) -> FakeCamera {
    FakeCamera {
        frame,
        error: None,
        probe: probe.clone(),
    }
}

pub fn deps(camera: FakeCamera, probe: &Probe) -> AppDependencies {
    AppDependencies {
        camera: Box::new(camera),
        decoder: Box::new(RqrrDecoder::new()),
        encoder: Box::new(QrcodeEncoder),
        clipboard: Box::new(MemoryClipboard(probe.clone())),
        saver: Box::new(MemorySaver(probe.clone())),
        haptics: Box::new(CountingHaptics(probe.clone())),
    }
}
