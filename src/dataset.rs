// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Dataset import, export and working folder cleanup
//!
//! Image and tag files are copied verbatim, one file at a time. A failure on
//! one file is recorded in the report and the remaining files are still
//! processed, so a run can leave partial results behind.

use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::collection::scan_images;
use crate::error::FileFailure;
use crate::tags::sidecar_path;
use crate::{AmaltheaError, Result};

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ImportReport {
    pub images_imported: usize,
    pub tags_imported: usize,
    /// Source images and tag files left alone because the working folder
    /// already had a file of that name
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ExportReport {
    pub dataset_dir: PathBuf,
    pub images_exported: usize,
    pub tags_exported: usize,
    pub failures: Vec<FileFailure>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ClearReport {
    pub deleted: usize,
    pub failures: Vec<FileFailure>,
}

fn require_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(AmaltheaError::NotADirectory(path.to_path_buf()))
    }
}

/// Copy `src` into `dir` under its own file name
fn copy_into(src: &Path, dir: &Path) -> std::io::Result<PathBuf> {
    let name = src.file_name().ok_or_else(|| {
        std::io::Error::new(ErrorKind::InvalidInput, "path has no file name")
    })?;
    let dest = dir.join(name);
    fs::copy(src, &dest)?;
    Ok(dest)
}

/// Copy the images of `source` (and their sidecars) into `working_dir`.
///
/// Existing files in the working folder are never overwritten: an image whose
/// name is already taken is skipped together with its sidecar, and a sidecar
/// whose name is taken by another image's tags is skipped on its own.
pub fn import_folder(source: &Path, working_dir: &Path) -> Result<ImportReport> {
    require_dir(source)?;
    if !working_dir.exists() {
        fs::create_dir_all(working_dir)?;
        info!("Created image directory: {:?}", working_dir);
    }

    let mut report = ImportReport::default();

    for image in scan_images(source)? {
        let Some(name) = image.file_name() else { continue };
        if working_dir.join(name).exists() {
            debug!("Skipping {:?}: already present in working folder", image);
            report.skipped.push(image);
            continue;
        }

        if let Err(e) = copy_into(&image, working_dir) {
            warn!("Failed to import {:?}: {}", image, e);
            report.failures.push(FileFailure::new(&image, e));
            continue;
        }
        report.images_imported += 1;

        let tags = sidecar_path(&image);
        if !tags.is_file() {
            continue;
        }
        if tags.file_name().is_some_and(|n| working_dir.join(n).exists()) {
            warn!("Not importing {:?}: tag file already present in working folder", tags);
            report.skipped.push(tags);
            continue;
        }
        match copy_into(&tags, working_dir) {
            Ok(_) => report.tags_imported += 1,
            Err(e) => {
                warn!("Failed to import tags {:?}: {}", tags, e);
                report.failures.push(FileFailure::new(&tags, e));
            }
        }
    }

    info!(
        "Imported {} images and {} tag files from {:?} ({} skipped, {} failed)",
        report.images_imported, report.tags_imported, source,
        report.skipped.len(), report.failures.len()
    );
    Ok(report)
}

/// Resolve `destination/subdir` and refuse it when it is the working folder
/// or lies inside it. Copying a file onto itself truncates it.
fn resolve_dataset_dir(working_dir: &Path, destination: &Path, subdir: &str) -> Result<PathBuf> {
    let dataset_dir = fs::canonicalize(destination)?.join(subdir);
    let resolved = fs::canonicalize(&dataset_dir).unwrap_or_else(|_| dataset_dir.clone());

    if let Ok(working) = fs::canonicalize(working_dir) {
        if resolved.starts_with(&working) {
            return Err(AmaltheaError::ExportIntoWorkingFolder(resolved));
        }
    }
    Ok(resolved)
}

/// Copy `images` and their sidecars into `destination/subdir`.
///
/// The working folder is left untouched; clearing it is a separate step.
/// An existing dataset folder is reused and same-named files in it are
/// replaced.
pub fn export_dataset(
    images: &[PathBuf],
    working_dir: &Path,
    destination: &Path,
    subdir: &str,
) -> Result<ExportReport> {
    if images.is_empty() {
        return Err(AmaltheaError::NoImages);
    }
    require_dir(destination)?;

    let dataset_dir = resolve_dataset_dir(working_dir, destination, subdir)?;
    if dataset_dir.exists() {
        warn!("Dataset folder {:?} already exists; same-named files will be replaced", dataset_dir);
    }
    fs::create_dir_all(&dataset_dir)?;

    let mut report = ExportReport {
        dataset_dir,
        ..Default::default()
    };

    for image in images {
        if let Err(e) = copy_into(image, &report.dataset_dir) {
            warn!("Failed to export {:?}: {}", image, e);
            report.failures.push(FileFailure::new(image, e));
            continue;
        }
        report.images_exported += 1;

        let tags = sidecar_path(image);
        if tags.is_file() {
            match copy_into(&tags, &report.dataset_dir) {
                Ok(_) => report.tags_exported += 1,
                Err(e) => {
                    warn!("Failed to export tags {:?}: {}", tags, e);
                    report.failures.push(FileFailure::new(&tags, e));
                }
            }
        }
    }

    info!(
        "Exported {} images and {} tag files to {:?} ({} failed)",
        report.images_exported, report.tags_exported, report.dataset_dir, report.failures.len()
    );
    Ok(report)
}

/// Delete every regular file in `working_dir` except `reserved_file`.
///
/// Performs no confirmation of its own; callers must obtain it first.
pub fn clear_working_folder(working_dir: &Path, reserved_file: &str) -> Result<ClearReport> {
    let mut report = ClearReport::default();

    let entries = match fs::read_dir(working_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(report),
        Err(e) => return Err(e.into()),
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to read an entry of {:?}: {}", working_dir, e);
                report.failures.push(FileFailure::new(working_dir, e));
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() || entry.file_name() == reserved_file {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => report.deleted += 1,
            Err(e) => {
                warn!("Failed to delete {:?}: {}", path, e);
                report.failures.push(FileFailure::new(&path, e));
            }
        }
    }

    info!("Cleared {} files from {:?}", report.deleted, working_dir);
    Ok(report)
}
