// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the QR scanner and generator
//!
//! None of these errors is fatal to an interactive session: each one maps to
//! a specific UI state from which the user can retry the triggering action.

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera access errors
    Camera(CameraError),
    /// Clipboard errors
    Clipboard(ClipboardError),
    /// QR encoding errors
    Encode(EncodeError),
    /// PNG export errors
    Export(ExportError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Camera access errors
///
/// Raised when a stream cannot be acquired. The scanner reverts to its
/// inactive state and waits for the user to try again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// No camera devices found
    NoCameraFound,
    /// Access to the device was refused (permissions)
    PermissionDenied(String),
    /// Camera is busy or in use by another process
    Busy(String),
    /// Camera initialization failed
    InitializationFailed(String),
    /// Requested format is not produced by the device
    InvalidFormat(String),
    /// Camera disconnected during operation
    Disconnected,
}

/// Clipboard errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// There is no scan result to copy
    NothingToCopy,
    /// No clipboard is reachable (no display server, headless session)
    Unavailable(String),
    /// The clipboard refused the write
    Denied(String),
}

/// QR encoding errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The payload does not fit in the largest QR symbol at the chosen level
    DataTooLong,
    /// Any other encoder failure
    Failed(String),
}

/// PNG export errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// PNG encoding failed
    EncodingFailed(String),
    /// Writing the file failed
    SaveFailed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Clipboard(e) => write!(f, "Clipboard error: {}", e),
            AppError::Encode(e) => write!(f, "Encoding error: {}", e),
            AppError::Export(e) => write!(f, "Export error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NoCameraFound => write!(f, "No camera devices found"),
            CameraError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            CameraError::Busy(msg) => write!(f, "Camera is busy: {}", msg),
            CameraError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            CameraError::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            CameraError::Disconnected => write!(f, "Camera disconnected"),
        }
    }
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::NothingToCopy => write!(f, "Nothing to copy"),
            ClipboardError::Unavailable(msg) => write!(f, "Clipboard unavailable: {}", msg),
            ClipboardError::Denied(msg) => write!(f, "Clipboard write refused: {}", msg),
        }
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::DataTooLong => write!(f, "Text is too long for a QR code"),
            EncodeError::Failed(msg) => write!(f, "QR encoding failed: {}", msg),
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::EncodingFailed(msg) => write!(f, "PNG encoding failed: {}", msg),
            ExportError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraError {}
impl std::error::Error for ClipboardError {}
impl std::error::Error for EncodeError {}
impl std::error::Error for ExportError {}

// Conversions from sub-errors to AppError
impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<ClipboardError> for AppError {
    fn from(err: ClipboardError) -> Self {
        AppError::Clipboard(err)
    }
}

impl From<EncodeError> for AppError {
    fn from(err: EncodeError) -> Self {
        AppError::Encode(err)
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::Export(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::SaveFailed(err.to_string())
    }
}

impl From<std::io::Error> for CameraError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => CameraError::NoCameraFound,
            std::io::ErrorKind::PermissionDenied => CameraError::PermissionDenied(err.to_string()),
            _ if err.raw_os_error() == Some(16) => CameraError::Busy(err.to_string()),
            _ => CameraError::InitializationFailed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_maps_to_camera_error() {
        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        assert!(matches!(
            CameraError::from(denied),
            CameraError::PermissionDenied(_)
        ));

        let missing = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert_eq!(CameraError::from(missing), CameraError::NoCameraFound);

        // EBUSY
        let busy = std::io::Error::from_raw_os_error(16);
        assert!(matches!(CameraError::from(busy), CameraError::Busy(_)));
    }

    #[test]
    fn test_app_error_display_wraps_source() {
        let err: AppError = CameraError::NoCameraFound.into();
        assert_eq!(err.to_string(), "Camera error: No camera devices found");

        let err: AppError = ClipboardError::NothingToCopy.into();
        assert_eq!(err.to_string(), "Clipboard error: Nothing to copy");
    }
}
