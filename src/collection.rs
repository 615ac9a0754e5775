// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Image collection for one folder: enumeration and wraparound navigation

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::Result;

/// Image extensions recognised in a folder (compared case-insensitively)
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

/// Check whether a path carries an allow-listed image extension
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// List the regular image files directly inside `dir`, sorted by full path.
/// Subdirectories are not descended into.
pub fn scan_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !has_image_extension(&path) {
            continue;
        }
        // Follows symlinks, so a link to an image counts as an image
        if path.is_file() {
            images.push(path);
        } else {
            debug!("Skipping non-file entry: {:?}", path);
        }
    }

    images.sort();
    Ok(images)
}

/// Resolve the directory part of `path` against the filesystem, keeping the
/// file name as given. `None` when the directory cannot be resolved.
///
/// Relative paths, `.`/`..` components and a symlinked folder all map to the
/// form produced by [`ImageCollection::load`].
pub fn canonical_image_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::canonicalize(parent).ok().map(|dir| dir.join(name))
}

/// Where a path sits within a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Found(usize),
    NotFound,
}

/// Ordered image paths of one folder. Rebuilt wholesale on every load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageCollection {
    dir: PathBuf,
    images: Vec<PathBuf>,
}

impl ImageCollection {
    /// Build a collection from an explicit list (sorted on construction)
    pub fn from_paths(dir: impl Into<PathBuf>, mut images: Vec<PathBuf>) -> Self {
        images.sort();
        Self { dir: dir.into(), images }
    }

    /// Enumerate `dir`, creating it first if absent.
    ///
    /// The folder is canonicalized, so every image path in the collection is
    /// absolute. Any enumeration failure is logged and produces an empty
    /// collection.
    pub fn load(dir: &Path) -> Self {
        if !dir.exists() {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!("Error creating image directory {:?}: {}", dir, e);
                return Self { dir: dir.to_path_buf(), images: Vec::new() };
            }
            info!("Created image directory: {:?}", dir);
        }

        let dir = fs::canonicalize(dir).unwrap_or_else(|e| {
            warn!("Error resolving image directory {:?}: {}", dir, e);
            dir.to_path_buf()
        });

        match scan_images(&dir) {
            Ok(images) => {
                info!("Found {} images in {:?}", images.len(), dir);
                Self { dir, images }
            }
            Err(e) => {
                warn!("Error loading images from {:?}: {}", dir, e);
                Self { dir, images: Vec::new() }
            }
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn images(&self) -> &[PathBuf] {
        &self.images
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.images.get(index).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn first(&self) -> Option<&Path> {
        self.images.first().map(PathBuf::as_path)
    }

    pub fn last(&self) -> Option<&Path> {
        self.images.last().map(PathBuf::as_path)
    }

    /// Find the index of `path` in the collection.
    ///
    /// A path spelled differently from the collection's own (relative, or
    /// through `.`/`..`) is resolved against the filesystem before giving up.
    pub fn locate(&self, path: &Path) -> Lookup {
        if let Some(index) = self.position(path) {
            return Lookup::Found(index);
        }
        match canonical_image_path(path).and_then(|p| self.position(&p)) {
            Some(index) => Lookup::Found(index),
            None => Lookup::NotFound,
        }
    }

    fn position(&self, path: &Path) -> Option<usize> {
        self.images.binary_search_by(|p| p.as_path().cmp(path)).ok()
    }

    /// Image after `current`, wrapping to the first.
    /// A path outside the collection yields the first image.
    pub fn next(&self, current: &Path) -> Option<&Path> {
        match self.locate(current) {
            Lookup::Found(index) => self.get((index + 1) % self.len()),
            Lookup::NotFound => self.first(),
        }
    }

    /// Image before `current`, wrapping to the last.
    /// A path outside the collection yields the last image.
    pub fn previous(&self, current: &Path) -> Option<&Path> {
        match self.locate(current) {
            Lookup::Found(index) => self.get((index + self.len() - 1) % self.len()),
            Lookup::NotFound => self.last(),
        }
    }
}
