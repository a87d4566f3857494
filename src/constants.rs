// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Interval between scan loop ticks (one display refresh at ~60Hz)
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Quiet window before typed text is turned into a QR code
pub const INPUT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Length of the haptic pulse emitted on a successful scan
pub const HAPTIC_PULSE: Duration = Duration::from_millis(200);

/// File name offered when downloading a generated code
pub const DOWNLOAD_FILE_NAME: &str = "qrcode.png";

/// Default folder name used when no download directory is configured
pub const DEFAULT_SAVE_FOLDER: &str = "QR Codes";

/// Application directory name under the config and cache directories
pub const APP_DIR_NAME: &str = "qrcam";

/// Capture formats requested from V4L2 devices, in order of preference
pub const PREFERRED_FOURCCS: [&[u8; 4]; 4] = [b"YUYV", b"MJPG", b"RGB3", b"GREY"];

/// Capture resolution requested from V4L2 devices
///
/// QR codes are decoded well at this size and it keeps per-tick work low.
pub const CAPTURE_WIDTH: u32 = 640;
pub const CAPTURE_HEIGHT: u32 = 480;

/// Number of mmap buffers used by the V4L2 capture stream
pub const CAPTURE_BUFFERS: u32 = 4;

/// Rendering presets shared by the two page profiles
pub mod preview {
    /// Square size of the generated image in the standard profile
    pub const STANDARD_SIZE: u32 = 256;
    /// Square size of the generated image in the classic profile
    pub const CLASSIC_SIZE: u32 = 200;
    /// Payload generated when the standard profile enters the generate tab
    pub const STANDARD_SEED: &str = "https://seron.dev";
    /// Quiet zone around the symbol, in modules
    pub const QUIET_ZONE_MODULES: u32 = 4;
}

/// Copy confirmation durations for the two page profiles
pub mod copy_feedback {
    use std::time::Duration;

    pub const STANDARD: Duration = Duration::from_millis(1500);
    pub const CLASSIC: Duration = Duration::from_millis(2000);
}

/// Image file extensions accepted by the still image camera
pub mod file_formats {
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp"];

    /// Check if an extension (lowercase, without dot) is a supported image
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext)
    }
}
