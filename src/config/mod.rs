// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for Amalthea

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Folder holding the active image set
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    /// Placeholder file that clearing the working folder never deletes
    #[serde(default = "default_reserved_file")]
    pub reserved_file: String,

    /// Preview sizing
    #[serde(default)]
    pub preview: PreviewConfig,

    /// Dataset export settings
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PreviewConfig {
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    #[serde(default = "default_max_height")]
    pub max_height: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExportConfig {
    /// Subdirectory created under the chosen destination
    #[serde(default = "default_export_subdir")]
    pub subdir: String,
}

// Default value functions
fn default_working_dir() -> PathBuf { PathBuf::from("images") }
fn default_reserved_file() -> String { ".gitkeep".to_string() }
fn default_max_width() -> u32 { 700 }
fn default_max_height() -> u32 { 400 }
fn default_export_subdir() -> String { "dataset".to_string() }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            reserved_file: default_reserved_file(),
            preview: PreviewConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_height: default_max_height(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            subdir: default_export_subdir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::AmaltheaError::Config(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values that would make the working folder unusable
    pub fn validate(&self) -> crate::Result<()> {
        if self.working_dir.as_os_str().is_empty() {
            return Err(crate::AmaltheaError::Config("working_dir must not be empty".to_string()));
        }
        if self.reserved_file.contains(['/', '\\']) {
            return Err(crate::AmaltheaError::Config(format!(
                "reserved_file must be a bare file name, got {:?}",
                self.reserved_file
            )));
        }
        if self.export.subdir.trim().is_empty() {
            return Err(crate::AmaltheaError::Config("export.subdir must not be empty".to_string()));
        }
        if self.preview.max_width == 0 || self.preview.max_height == 0 {
            return Err(crate::AmaltheaError::Config("preview bounds must be non-zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.working_dir, PathBuf::from("images"));
        assert_eq!(config.reserved_file, ".gitkeep");
        assert_eq!(config.preview.max_width, 700);
        assert_eq!(config.preview.max_height, 400);
        assert_eq!(config.export.subdir, "dataset");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("amalthea.json");

        let mut config = AppConfig::default();
        config.working_dir = PathBuf::from("/data/cats");
        config.preview.max_width = 1024;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.working_dir, PathBuf::from("/data/cats"));
        assert_eq!(loaded.preview.max_width, 1024);
        assert_eq!(loaded.preview.max_height, 400);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("amalthea.json");
        std::fs::write(&path, r#"{ "working_dir": "shots" }"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.working_dir, PathBuf::from("shots"));
        assert_eq!(config.reserved_file, ".gitkeep");
        assert_eq!(config.export.subdir, "dataset");
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("amalthea.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, crate::AmaltheaError::Config(_)));
    }

    #[test]
    fn test_reserved_file_with_separator_rejected() {
        let mut config = AppConfig::default();
        config.reserved_file = "sub/.gitkeep".to_string();
        assert!(config.validate().is_err());
    }
}
