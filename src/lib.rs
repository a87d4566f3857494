// SPDX-License-Identifier: GPL-3.0-only

//! qrcam - scan QR codes with a camera or generate them from text
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Page logic: view modes, scanner, generator, copy action
//! - [`backends`]: Camera, clipboard and haptics abstraction
//! - [`pipelines`]: QR code rendering and PNG encoding
//! - [`config`]: User configuration handling
//! - [`storage`]: Saving downloaded codes
//! - [`terminal`]: Interactive terminal page
//!
//! # Example
//!
//! ```ignore
//! let config = qrcam::Config::load();
//! let mut app = qrcam::App::new(config.clone(), qrcam::AppDependencies::system(&config));
//! app.open();
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod pipelines;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use app::{App, AppDependencies, ViewMode};
pub use config::{Config, Profile};
pub use errors::{AppError, AppResult};
