// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Amalthea: Image Tagging
//!
//! Browse a folder of images and keep free-text tags for each one in a
//! sidecar `.txt` file next to the image.

pub mod bulk;
pub mod collection;
pub mod config;
pub mod dataset;
pub mod error;
pub mod preview;
pub mod session;
pub mod tags;

pub use config::AppConfig;
pub use error::{AmaltheaError, FileFailure, Result};
pub use session::Session;
