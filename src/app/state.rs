// SPDX-License-Identifier: GPL-3.0-only

//! Application state types

use crate::app::frame_processor::{QrDecoder, RqrrDecoder};
use crate::backends::camera::{CameraBackend, V4l2Backend};
use crate::backends::clipboard::{Clipboard, SystemClipboard};
use crate::backends::haptics::{Haptics, TerminalBell};
use crate::config::Config;
use crate::pipelines::qr::{QrEncoder, QrcodeEncoder};
use crate::storage::{DirectorySaver, FileSaver};

/// Which mode the page is in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Scanning,
    Generating,
}

/// The region currently rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Camera preview, scan status and result
    Scanner,
    /// Text input, generated code and download
    Generator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// Message shown to the user until dismissed or replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

/// Platform services the app talks to
pub struct AppDependencies {
    pub camera: Box<dyn CameraBackend>,
    pub decoder: Box<dyn QrDecoder>,
    pub encoder: Box<dyn QrEncoder>,
    pub clipboard: Box<dyn Clipboard>,
    pub saver: Box<dyn FileSaver>,
    pub haptics: Box<dyn Haptics>,
}

impl AppDependencies {
    /// The real services of this machine
    pub fn system(config: &Config) -> Self {
        Self {
            camera: Box::new(V4l2Backend::new()),
            decoder: Box::new(RqrrDecoder::new()),
            encoder: Box::new(QrcodeEncoder),
            clipboard: Box::new(SystemClipboard::new()),
            saver: Box::new(DirectorySaver::new(config.download_dir())),
            haptics: Box::new(TerminalBell),
        }
    }
}
