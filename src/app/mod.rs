// SPDX-License-Identifier: GPL-3.0-only

//! Main application module
//!
//! The app is a single page with two modes. Scanning shows the camera preview
//! and decodes frames until a code is found; generating turns typed text into
//! a downloadable QR code. Only one mode's region is shown at a time and
//! leaving scan mode always releases the camera.
//!
//! # Architecture
//!
//! - `session`: Camera stream ownership and the preview surface
//! - `frame_processor`: The cooperative scan loop and decoder seam
//! - `scanner`: Scan mode controller
//! - `generator`: Generate mode controller
//! - `copy`: Copy-to-clipboard action
//! - `timers`: Debounce and revert timers
//! - `state`: Mode, notice and dependency types
//!
//! Everything here runs on the UI thread; [`App::on_frame`] is called once
//! per display refresh.

pub mod copy;
pub mod frame_processor;
pub mod generator;
pub mod scanner;
pub mod session;
mod state;
pub mod timers;

pub use copy::CopyAction;
pub use generator::{GenerateOutcome, GeneratedCode, GenerationController};
pub use scanner::{ScanStatus, Scanner};
pub use session::{CaptureSession, PreviewSurface};
pub use state::{AppDependencies, Notice, NoticeKind, Region, ViewMode};

use crate::backends::camera::StreamConstraints;
use crate::backends::clipboard::Clipboard;
use crate::config::Config;
use crate::errors::{ClipboardError, EncodeError};
use crate::storage::FileSaver;
use frame_processor::{DecodeOptions, ScanLoop, ScanResult, TickOutcome};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

const CAMERA_ERROR_NOTICE: &str =
    "Could not access the camera. Please ensure you have given permission.";
const EMPTY_INPUT_NOTICE: &str = "Please enter text or a URL.";
const NOTHING_TO_DOWNLOAD_NOTICE: &str = "Generate a QR code first!";

pub struct App {
    config: Config,
    mode: ViewMode,
    scanner: Scanner,
    generator: GenerationController,
    copy: CopyAction,
    clipboard: Box<dyn Clipboard>,
    saver: Box<dyn FileSaver>,
    preview: PreviewSurface,
    input: String,
    notice: Option<Notice>,
}

impl App {
    pub fn new(config: Config, deps: AppDependencies) -> Self {
        let constraints = StreamConstraints {
            facing: config.facing_mode,
            device: config.camera_device.clone(),
            ..StreamConstraints::default()
        };
        let preview = PreviewSurface::new();
        let session = CaptureSession::new(deps.camera, constraints, preview.clone());
        let scan_loop = ScanLoop::new(DecodeOptions {
            inversion: config.inversion,
            max_dimension: config.max_decode_dimension,
        });
        let scanner = Scanner::new(
            session,
            scan_loop,
            deps.decoder,
            deps.haptics,
            config.haptic_pulse(),
        );
        let generator = GenerationController::new(
            deps.encoder,
            config.render_options(),
            config.debounce(),
            config.download_file_name.clone(),
        );

        Self {
            copy: CopyAction::new(config.copy_feedback()),
            config,
            mode: ViewMode::Scanning,
            scanner,
            generator,
            clipboard: deps.clipboard,
            saver: deps.saver,
            preview,
            input: String::new(),
            notice: None,
        }
    }

    /// Show the page: scan mode, with the camera running if configured
    pub fn open(&mut self) {
        info!(profile = ?self.config.profile, "Opening page");
        self.mode = ViewMode::Scanning;
        if self.config.scan_on_start {
            self.start_scanner();
        }
    }

    /// Switch modes
    ///
    /// Entering scan mode (re)starts the scanner. Entering generate mode
    /// releases the camera and seeds the default payload when nothing was
    /// ever generated.
    pub fn switch_to(&mut self, mode: ViewMode) {
        debug!(from = ?self.mode, to = ?mode, "Switching mode");
        self.mode = mode;
        match mode {
            ViewMode::Scanning => self.start_scanner(),
            ViewMode::Generating => {
                self.scanner.stop();
                if self.input.trim().is_empty() {
                    if let Some(seed) = self.config.default_text.clone() {
                        self.generator.seed_default(&seed);
                    }
                }
            }
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn visible_region(&self) -> Region {
        match self.mode {
            ViewMode::Scanning => Region::Scanner,
            ViewMode::Generating => Region::Generator,
        }
    }

    /// Start/stop button of the scan region
    pub fn toggle_scan(&mut self) {
        if self.scanner.is_scanning() {
            self.scanner.stop();
        } else {
            self.start_scanner();
        }
    }

    fn start_scanner(&mut self) {
        if let Err(e) = self.scanner.start() {
            warn!(error = %e, "Scanner unavailable");
            self.notice = Some(Notice::error(CAMERA_ERROR_NOTICE));
        }
    }

    /// Advance timers and the scan loop by one refresh
    pub fn on_frame(&mut self, now: Instant) -> Option<TickOutcome> {
        let outcome = match self.mode {
            ViewMode::Scanning => Some(self.scanner.tick()),
            ViewMode::Generating => None,
        };

        if let Some(result) = self.generator.poll(now) {
            self.report_generation(result);
        }
        self.copy.poll(now);
        outcome
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn type_char(&mut self, c: char, now: Instant) {
        self.input.push(c);
        self.input_changed(now);
    }

    pub fn backspace(&mut self, now: Instant) {
        if self.input.pop().is_some() {
            self.input_changed(now);
        }
    }

    pub fn set_input(&mut self, text: &str, now: Instant) {
        self.input = text.to_string();
        self.input_changed(now);
    }

    pub fn clear_input(&mut self, now: Instant) {
        self.set_input("", now);
    }

    fn input_changed(&mut self, now: Instant) {
        if self.config.live_generation {
            self.generator.on_input_changed(&self.input, now);
        }
    }

    /// Generate button: render the current input right away
    pub fn submit_input(&mut self) {
        if self.input.trim().is_empty() {
            self.notice = Some(Notice::error(EMPTY_INPUT_NOTICE));
            return;
        }
        self.generator.cancel_pending();
        let result = self.generator.generate(&self.input);
        self.report_generation(result);
    }

    fn report_generation(&mut self, result: Result<GenerateOutcome, EncodeError>) {
        if let Err(e) = result {
            let text = match e {
                EncodeError::DataTooLong => "Text is too long for a QR code.".to_string(),
                other => format!("Could not generate a QR code: {}", other),
            };
            self.notice = Some(Notice::error(text));
        }
    }

    /// Copy button of the scan result
    pub fn copy_result(&mut self, now: Instant) -> Result<(), ClipboardError> {
        self.copy.copy(
            self.clipboard.as_mut(),
            self.scanner.visible_result(),
            now,
        )
    }

    pub fn is_copy_confirming(&self, now: Instant) -> bool {
        self.copy.is_confirming(now)
    }

    /// Download button of the generated code
    pub fn download(&mut self) -> Option<PathBuf> {
        match self.generator.download(self.saver.as_ref()) {
            Ok(Some(path)) => {
                self.notice = Some(Notice::info(format!("Saved {}", path.display())));
                Some(path)
            }
            Ok(None) => {
                self.notice = Some(Notice::error(NOTHING_TO_DOWNLOAD_NOTICE));
                None
            }
            Err(e) => {
                warn!(error = %e, "Download failed");
                self.notice = Some(Notice::error(format!("Could not save the QR code: {}", e)));
                None
            }
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    pub fn scan_result(&self) -> Option<&ScanResult> {
        self.scanner.visible_result()
    }

    pub fn generator(&self) -> &GenerationController {
        &self.generator
    }

    pub fn preview(&self) -> &PreviewSurface {
        &self.preview
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Release the camera before the app goes away
    pub fn shutdown(&mut self) {
        self.scanner.stop();
        info!("App shut down");
    }
}
