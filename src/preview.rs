// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Decoded images scaled to fit a display box

use image::{DynamicImage, GenericImageView};
use std::path::Path;
use tracing::debug;

use crate::Result;

/// An image decoded for display, never larger than the box it was fitted to
pub struct Preview {
    original: (u32, u32),
    image: DynamicImage,
}

impl Preview {
    /// Decode `path` and shrink it to fit within `max_width` x `max_height`.
    ///
    /// Aspect ratio is preserved. Images already inside the box are not upscaled.
    pub fn fit(path: &Path, max_width: u32, max_height: u32) -> Result<Self> {
        let img = image::open(path)?;
        let original = img.dimensions();
        let (width, height) = original;

        let img = if width > max_width || height > max_height {
            debug!("Scaling {:?} from {}x{} to fit {}x{}", path, width, height, max_width, max_height);
            img.resize(max_width, max_height, image::imageops::FilterType::Lanczos3)
        } else {
            img
        };

        Ok(Self { original, image: img })
    }

    /// Pixel dimensions of the file on disk
    pub fn original_size(&self) -> (u32, u32) {
        self.original
    }

    /// Pixel dimensions after fitting
    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}
