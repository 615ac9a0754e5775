// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Sidecar tag files
//!
//! Every image `dir/name.ext` has its tags in `dir/name.txt`. The file holds
//! the tag string verbatim as UTF-8 with no header or escaping.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

use crate::Result;

/// Extension of sidecar tag files
pub const TAG_EXTENSION: &str = "txt";

/// Separator used whenever a tag set is written back
pub const TAG_SEPARATOR: &str = ", ";

/// Derive the sidecar path for an image: same directory, same stem, `.txt`
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    image_path.with_extension(TAG_EXTENSION)
}

/// Reads and writes sidecar tag files. Holds no cache; every load hits disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagStore;

impl TagStore {
    pub fn new() -> Self {
        Self
    }

    /// Write `tags` verbatim to the image's sidecar, replacing any previous content
    pub fn save(&self, image_path: &Path, tags: &str) -> Result<()> {
        let path = sidecar_path(image_path);
        fs::write(&path, tags).map_err(|e| {
            error!("Error saving tags to {:?}: {}", path, e);
            e.into()
        })
    }

    /// Read the image's sidecar. Missing or unreadable files yield an empty string.
    pub fn load(&self, image_path: &Path) -> String {
        self.try_load(image_path).unwrap_or_else(|e| {
            warn!("Error loading tags for {:?}: {}", image_path, e);
            String::new()
        })
    }

    /// Read the image's sidecar, treating only a missing file as "no tags"
    pub fn try_load(&self, image_path: &Path) -> Result<String> {
        match fs::read_to_string(sidecar_path(image_path)) {
            Ok(tags) => Ok(tags),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the image's sidecar. Succeeds when there was nothing to remove.
    pub fn delete(&self, image_path: &Path) -> Result<()> {
        let path = sidecar_path(image_path);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Deleted tags at {:?}", path);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                error!("Error deleting tags at {:?}: {}", path, e);
                Err(e.into())
            }
        }
    }
}

/// Ordered list of tags for one image
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stored tag string: split on commas, trim, drop empty entries.
    ///
    /// Spaces inside an entry are kept, so multi-word tags survive a rewrite.
    pub fn parse(text: &str) -> Self {
        let tags = text
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();
        Self { tags }
    }

    /// Exact, case-sensitive membership test
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Append `tag` unless already present. Returns whether the set changed.
    pub fn push_unique(&mut self, tag: &str) -> bool {
        if self.contains(tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tags.join(TAG_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sidecar_path_replaces_extension() {
        assert_eq!(
            sidecar_path(Path::new("/data/images/photo.jpg")),
            PathBuf::from("/data/images/photo.txt")
        );
        assert_eq!(
            sidecar_path(Path::new("/data/images/archive.v2.PNG")),
            PathBuf::from("/data/images/archive.v2.txt")
        );
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("photo.jpg");
        let store = TagStore::new();

        store.save(&image, "cat, pet").unwrap();

        assert_eq!(store.load(&image), "cat, pet");
        assert!(dir.path().join("photo.txt").is_file());
    }

    #[test]
    fn test_save_is_verbatim() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("a.png");
        let store = TagStore::new();

        let text = "  ünïcode  tags,, trailing space \n";
        store.save(&image, text).unwrap();
        assert_eq!(store.load(&image), text);
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("a.png");
        let store = TagStore::new();

        store.save(&image, "first, second, third").unwrap();
        store.save(&image, "x").unwrap();
        assert_eq!(store.load(&image), "x");
    }

    #[test]
    fn test_load_without_sidecar_is_empty() {
        let dir = tempdir().unwrap();
        let store = TagStore::new();
        assert_eq!(store.load(&dir.path().join("none.png")), "");
    }

    #[test]
    fn test_try_load_reports_unreadable_sidecar() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("a.png");
        // A directory where the sidecar should be cannot be read as text
        fs::create_dir(dir.path().join("a.txt")).unwrap();

        let store = TagStore::new();
        assert!(store.try_load(&image).is_err());
        assert_eq!(store.load(&image), "");
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("missing").join("a.png");
        let store = TagStore::new();
        assert!(store.save(&image, "cat").is_err());
    }

    #[test]
    fn test_delete_then_load_is_empty() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("a.png");
        let store = TagStore::new();

        store.save(&image, "cat, pet").unwrap();
        store.delete(&image).unwrap();

        assert_eq!(store.load(&image), "");
        assert!(!dir.path().join("a.txt").exists());
    }

    #[test]
    fn test_delete_missing_sidecar_succeeds() {
        let dir = tempdir().unwrap();
        let store = TagStore::new();
        assert!(store.delete(&dir.path().join("a.png")).is_ok());
    }

    #[test]
    fn test_parse_comma_separated() {
        let set = TagSet::parse(" cat ,pet,, big dog ,");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["cat", "pet", "big dog"]);
    }

    #[test]
    fn test_parse_keeps_multi_word_tags() {
        let set = TagSet::parse("big dog");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["big dog"]);
        assert_eq!(TagSet::parse(&set.to_string()), set);
    }

    #[test]
    fn test_parse_empty() {
        assert!(TagSet::parse("").is_empty());
        assert!(TagSet::parse(" , ,").is_empty());
    }

    #[test]
    fn test_display_normalizes_separator() {
        let set = TagSet::parse("a,b ,  c");
        assert_eq!(set.to_string(), "a, b, c");
    }

    #[test]
    fn test_push_unique_is_case_sensitive() {
        let mut set = TagSet::parse("cat");
        assert!(!set.push_unique("cat"));
        assert!(set.push_unique("Cat"));
        assert_eq!(set.len(), 2);
    }
}
