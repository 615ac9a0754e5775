// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Tagging session over the working folder
//!
//! The working folder on disk is the only source of truth. The session holds a
//! derived view of it (the image collection and the current position) and
//! rebuilds that view after every operation that adds or removes files.

use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::bulk::{self, BulkTagReport};
use crate::collection::{ImageCollection, Lookup};
use crate::dataset::{self, ClearReport, ExportReport, ImportReport};
use crate::preview::Preview;
use crate::tags::TagStore;
use crate::{AmaltheaError, AppConfig, Result};

/// Result of exporting, with the cleanup that optionally follows it
#[derive(Debug, Clone, Serialize)]
pub struct ExportOutcome {
    pub export: ExportReport,
    /// `None` when clearing was not requested or was skipped
    pub cleared: Option<ClearReport>,
}

/// Active working folder plus the image currently being tagged
pub struct Session {
    config: AppConfig,
    store: TagStore,
    collection: ImageCollection,
    current: Option<usize>,
}

impl Session {
    /// Open the configured working folder, creating it if needed
    pub fn open(config: AppConfig) -> Self {
        let collection = ImageCollection::load(&config.working_dir);
        let current = if collection.is_empty() { None } else { Some(0) };
        Self {
            config,
            store: TagStore::new(),
            collection,
            current,
        }
    }

    /// Re-enumerate the working folder.
    ///
    /// The current image stays selected if it still exists, otherwise the
    /// first image becomes current.
    pub fn reload(&mut self) {
        let previous = self.current().map(Path::to_path_buf);
        self.collection = ImageCollection::load(&self.config.working_dir);

        self.current = match previous.map(|p| self.collection.locate(&p)) {
            Some(Lookup::Found(index)) => Some(index),
            _ if self.collection.is_empty() => None,
            _ => Some(0),
        };
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &TagStore {
        &self.store
    }

    pub fn collection(&self) -> &ImageCollection {
        &self.collection
    }

    /// Absolute working folder as resolved by the last load
    pub fn working_dir(&self) -> &Path {
        self.collection.dir()
    }

    /// Path of the image being tagged, if any
    pub fn current(&self) -> Option<&Path> {
        self.current.and_then(|i| self.collection.get(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// One-line status such as "Image 2 of 5"
    pub fn status(&self) -> String {
        match self.current {
            Some(index) => format!("Image {} of {}", index + 1, self.collection.len()),
            None => "No images found in the images directory".to_string(),
        }
    }

    pub fn navigate_next(&mut self) -> Option<&Path> {
        let len = self.collection.len();
        self.current = self.current.filter(|_| len > 0).map(|i| (i + 1) % len);
        self.current()
    }

    pub fn navigate_previous(&mut self) -> Option<&Path> {
        let len = self.collection.len();
        self.current = self.current.filter(|_| len > 0).map(|i| (i + len - 1) % len);
        self.current()
    }

    /// Make `path` current if it belongs to the working collection
    pub fn select(&mut self, path: &Path) -> Lookup {
        let lookup = self.collection.locate(path);
        if let Lookup::Found(index) = lookup {
            self.current = Some(index);
        }
        lookup
    }

    /// Tag text of the current image, `None` when there is no current image
    pub fn current_tags(&self) -> Option<String> {
        self.current().map(|p| self.store.load(p))
    }

    /// Decode the current image scaled to the configured preview box
    pub fn current_preview(&self) -> Result<Preview> {
        let path = self.current().ok_or(AmaltheaError::NoImages)?;
        Preview::fit(path, self.config.preview.max_width, self.config.preview.max_height)
    }

    /// Save tag input for the current image.
    ///
    /// `None` means the input was left empty and stores an empty tag file.
    pub fn save_current_tags(&self, input: Option<&str>) -> Result<()> {
        let path = self.current().ok_or(AmaltheaError::NoImages)?;
        self.store.save(path, input.unwrap_or_default())?;
        info!("Tags saved for {:?}", path.file_name().unwrap_or_default());
        Ok(())
    }

    pub fn delete_current_tags(&self) -> Result<()> {
        let path = self.current().ok_or(AmaltheaError::NoImages)?;
        self.store.delete(path)
    }

    /// Merge `tag` into every image of the working collection
    pub fn apply_tag_to_all(&self, tag: &str) -> Result<BulkTagReport> {
        if self.collection.is_empty() {
            return Err(AmaltheaError::NoImages);
        }
        bulk::apply_tag_to_all(&self.store, tag, self.collection.images())
    }

    /// Merge `tag` into every image of a folder outside the working collection
    pub fn apply_tag_to_folder(&self, tag: &str, folder: &Path) -> Result<BulkTagReport> {
        bulk::apply_tag_to_folder(&self.store, tag, folder)
    }

    pub fn import_folder(&mut self, source: &Path) -> Result<ImportReport> {
        let report = dataset::import_folder(source, &self.config.working_dir);
        self.reload();
        report
    }

    /// Export the working collection, then clear the working folder if
    /// `clear_after` is set and every file was exported.
    pub fn export_dataset(&mut self, destination: &Path, clear_after: bool) -> Result<ExportOutcome> {
        let export = dataset::export_dataset(
            self.collection.images(),
            self.collection.dir(),
            destination,
            &self.config.export.subdir,
        )?;

        let cleared = if !clear_after {
            None
        } else if export.failures.is_empty() {
            Some(self.clear_working_folder()?)
        } else {
            warn!(
                "Not clearing working folder: {} files failed to export",
                export.failures.len()
            );
            None
        };

        Ok(ExportOutcome { export, cleared })
    }

    /// Delete everything in the working folder except the reserved placeholder
    pub fn clear_working_folder(&mut self) -> Result<ClearReport> {
        let report = dataset::clear_working_folder(&self.config.working_dir, &self.config.reserved_file);
        self.reload();
        report
    }
}
