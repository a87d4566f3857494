// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for the platform services the page relies on
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                  App Layer                   │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │  ┌─────────────┐    ┌──────────────────┐   │
//! │  │   Camera    │    │    Clipboard     │   │
//! │  │ (V4L2/file) │    │    (arboard)     │   │
//! │  └─────────────┘    └──────────────────┘   │
//! │  ┌─────────────┐                           │
//! │  │   Haptics   │                           │
//! │  │   (bell)    │                           │
//! │  └─────────────┘                           │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`camera`]: Device enumeration, stream acquisition and frame capture
//! - [`clipboard`]: System clipboard writes
//! - [`haptics`]: Success feedback on capable hosts

pub mod camera;
pub mod clipboard;
pub mod haptics;
