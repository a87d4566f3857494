// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as JSON under `<config dir>/qrcam/config.json`. Every field has a
//! default, so partial files are accepted and a missing file simply yields
//! the standard profile.

use crate::app::frame_processor::InversionAttempts;
use crate::backends::camera::FacingMode;
use crate::constants::{self, copy_feedback, preview};
use crate::errors::{AppError, AppResult};
use crate::pipelines::qr::{CorrectionLevel, RenderOptions, Rgb};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Page profile
///
/// The two historical variants of the page differ only in these presets.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// 256px codes, seeded generate tab, camera starts with the page
    #[default]
    Standard,
    /// 200px codes, manual start/stop and generate buttons, no seed
    Classic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Profile the remaining defaults were derived from
    pub profile: Profile,
    /// Square size of generated images in pixels
    pub preview_size: u32,
    /// Payload generated when the generate tab opens with nothing generated
    pub default_text: Option<String>,
    /// Quiet window before typed text is encoded, in milliseconds
    pub debounce_ms: u64,
    /// How long the copy confirmation stays visible, in milliseconds
    pub copy_feedback_ms: u64,
    /// File name used for downloads
    pub download_file_name: String,
    /// Download directory (defaults to the user's download directory)
    pub download_dir: Option<PathBuf>,
    /// Which way the camera should face
    pub facing_mode: FacingMode,
    /// Preferred camera device path, overrides the facing preference
    pub camera_device: Option<String>,
    /// Haptic pulse length on a successful scan, in milliseconds (0 disables)
    pub haptic_pulse_ms: u64,
    /// Start the camera as soon as the page opens
    pub scan_on_start: bool,
    /// Generate while typing; otherwise only on explicit submit
    pub live_generation: bool,
    /// Error correction level of generated codes
    pub correction_level: CorrectionLevel,
    /// Module colour, `#rrggbb`
    pub dark_color: String,
    /// Background colour, `#rrggbb`
    pub light_color: String,
    /// Polarities tried by the decoder
    pub inversion: InversionAttempts,
    /// Frames larger than this are downscaled before decoding
    pub max_decode_dimension: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_profile(Profile::Standard)
    }
}

impl Config {
    /// Build the defaults for a profile
    pub fn for_profile(profile: Profile) -> Self {
        let (preview_size, default_text, copy_feedback, interactive) = match profile {
            Profile::Standard => (
                preview::STANDARD_SIZE,
                Some(preview::STANDARD_SEED.to_string()),
                copy_feedback::STANDARD,
                true,
            ),
            Profile::Classic => (preview::CLASSIC_SIZE, None, copy_feedback::CLASSIC, false),
        };

        Self {
            profile,
            preview_size,
            default_text,
            debounce_ms: constants::INPUT_DEBOUNCE.as_millis() as u64,
            copy_feedback_ms: copy_feedback.as_millis() as u64,
            download_file_name: constants::DOWNLOAD_FILE_NAME.to_string(),
            download_dir: None,
            facing_mode: FacingMode::Environment,
            camera_device: None,
            haptic_pulse_ms: constants::HAPTIC_PULSE.as_millis() as u64,
            scan_on_start: interactive,
            live_generation: interactive,
            correction_level: CorrectionLevel::High,
            dark_color: "#000000".to_string(),
            light_color: "#ffffff".to_string(),
            inversion: InversionAttempts::DontInvert,
            max_decode_dimension: Some(crate::app::frame_processor::DEFAULT_MAX_DIMENSION),
        }
    }

    /// Switch profile, replacing only the preset fields
    pub fn with_profile(self, profile: Profile) -> Self {
        let presets = Self::for_profile(profile);
        Self {
            profile,
            preview_size: presets.preview_size,
            default_text: presets.default_text,
            copy_feedback_ms: presets.copy_feedback_ms,
            scan_on_start: presets.scan_on_start,
            live_generation: presets.live_generation,
            ..self
        }
    }

    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(constants::APP_DIR_NAME).join("config.json"))
    }

    /// Load the config from the default location
    ///
    /// Falls back to the defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            debug!("No config directory, using defaults");
            return Self::default();
        };

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                info!(path = %path.display(), profile = ?config.profile, "Loaded config");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
                Self::default()
            }
        }
    }

    /// Load the config from a specific file
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        debug!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> AppResult<()> {
        if self.preview_size == 0 {
            return Err(AppError::Config("preview_size must be positive".into()));
        }
        if self.download_file_name.trim().is_empty() {
            return Err(AppError::Config("download_file_name must not be empty".into()));
        }
        Rgb::from_hex(&self.dark_color)
            .ok_or_else(|| AppError::Config(format!("invalid dark_color {}", self.dark_color)))?;
        Rgb::from_hex(&self.light_color)
            .ok_or_else(|| AppError::Config(format!("invalid light_color {}", self.light_color)))?;
        Ok(())
    }

    /// Rendering options handed to the encoder
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            size: self.preview_size,
            dark: Rgb::from_hex(&self.dark_color).unwrap_or(Rgb::BLACK),
            light: Rgb::from_hex(&self.light_color).unwrap_or(Rgb::WHITE),
            correction_level: self.correction_level,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn copy_feedback(&self) -> Duration {
        Duration::from_millis(self.copy_feedback_ms)
    }

    pub fn haptic_pulse(&self) -> Option<Duration> {
        (self.haptic_pulse_ms > 0).then(|| Duration::from_millis(self.haptic_pulse_ms))
    }

    /// Directory downloads are written to
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| {
            dirs::download_dir()
                .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
                .join(constants::DEFAULT_SAVE_FOLDER)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_differ_only_in_presets() {
        let standard = Config::for_profile(Profile::Standard);
        let classic = Config::for_profile(Profile::Classic);

        assert_eq!(standard.preview_size, 256);
        assert_eq!(classic.preview_size, 200);
        assert_eq!(standard.default_text.as_deref(), Some("https://seron.dev"));
        assert_eq!(classic.default_text, None);
        assert!(standard.scan_on_start);
        assert!(!classic.scan_on_start);
        assert!(standard.live_generation);
        assert!(!classic.live_generation);

        assert_eq!(standard.debounce_ms, classic.debounce_ms);
        assert_eq!(standard.download_file_name, classic.download_file_name);
        assert_eq!(standard.correction_level, classic.correction_level);
    }

    #[test]
    fn test_with_profile_keeps_other_fields() {
        let config = Config {
            camera_device: Some("/dev/video2".to_string()),
            ..Config::default()
        }
        .with_profile(Profile::Classic);

        assert_eq!(config.profile, Profile::Classic);
        assert_eq!(config.preview_size, 200);
        assert_eq!(config.default_text, None);
        assert_eq!(config.camera_device.as_deref(), Some("/dev/video2"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{ "preview_size": 320 }"#).unwrap();
        assert_eq!(config.preview_size, 320);
        assert_eq!(config.download_file_name, "qrcode.png");
        assert_eq!(config.inversion, InversionAttempts::DontInvert);
    }

    #[test]
    fn test_validate_rejects_bad_colors() {
        let config = Config {
            dark_color: "black".to_string(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_render_options_follow_config() {
        let config = Config::for_profile(Profile::Classic);
        let options = config.render_options();
        assert_eq!(options.size, 200);
        assert_eq!(options.dark, Rgb::BLACK);
        assert_eq!(options.light, Rgb::WHITE);
        assert_eq!(options.correction_level, CorrectionLevel::High);
    }
}
