// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Bulk tagging: merge one tag into every image of a set

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::collection::scan_images;
use crate::error::FileFailure;
use crate::tags::{TagSet, TagStore};
use crate::{AmaltheaError, Result};

/// Outcome of a bulk tag run
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct BulkTagReport {
    /// Images whose sidecar was rewritten with the new tag
    pub tagged: usize,
    /// Images that already carried the tag and were left untouched
    pub already_tagged: usize,
    pub failures: Vec<FileFailure>,
}

/// Trim the requested tag and reject input that is not exactly one tag
fn normalize_tag(tag: &str) -> Result<&str> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(AmaltheaError::EmptyTag);
    }
    if tag.contains(',') {
        return Err(AmaltheaError::InvalidTag(tag.to_string()));
    }
    Ok(tag)
}

/// Merge `tag` into one image's tags. Returns whether the sidecar was rewritten.
fn merge_tag(store: &TagStore, image: &Path, tag: &str) -> Result<bool> {
    let mut tags = TagSet::parse(&store.try_load(image)?);
    if !tags.push_unique(tag) {
        return Ok(false);
    }
    store.save(image, &tags.to_string())?;
    Ok(true)
}

fn merge_into_all(store: &TagStore, tag: &str, images: &[PathBuf]) -> BulkTagReport {
    let mut report = BulkTagReport::default();

    for image in images {
        match merge_tag(store, image, tag) {
            Ok(true) => {
                debug!("Tagged {:?} with '{}'", image, tag);
                report.tagged += 1;
            }
            Ok(false) => report.already_tagged += 1,
            Err(e) => {
                warn!("Failed to tag {:?}: {}", image, e);
                report.failures.push(FileFailure::new(image, e));
            }
        }
    }

    report
}

/// Add `tag` to every image in `images` that does not already have it.
///
/// `tagged` in the report counts only the images actually rewritten, so a
/// second run with the same tag reports zero.
pub fn apply_tag_to_all(store: &TagStore, tag: &str, images: &[PathBuf]) -> Result<BulkTagReport> {
    let tag = normalize_tag(tag)?;
    let report = merge_into_all(store, tag, images);
    info!(
        "Applied '{}' to {} images ({} already tagged, {} failed)",
        tag, report.tagged, report.already_tagged, report.failures.len()
    );
    Ok(report)
}

/// Same merge as [`apply_tag_to_all`], over the images of an arbitrary folder
pub fn apply_tag_to_folder(store: &TagStore, tag: &str, folder: &Path) -> Result<BulkTagReport> {
    let tag = normalize_tag(tag)?;
    if !folder.is_dir() {
        return Err(AmaltheaError::NotADirectory(folder.to_path_buf()));
    }

    let images = scan_images(folder)?;
    let report = merge_into_all(store, tag, &images);
    info!(
        "Applied '{}' in {:?}: {} tagged, {} already tagged, {} failed",
        tag, folder, report.tagged, report.already_tagged, report.failures.len()
    );
    Ok(report)
}
