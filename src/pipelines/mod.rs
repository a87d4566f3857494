// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │  Input text  │ ──▶ │    QR Pipeline    │ ──▶ │  RGBA image  │
//! │              │     │  - qrcode matrix  │     │  PNG bytes   │
//! │              │     │  - Rendering      │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```

pub mod qr;
