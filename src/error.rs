// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for Amalthea

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Amalthea operations
pub type Result<T> = std::result::Result<T, AmaltheaError>;

/// Amalthea error types
#[derive(Error, Debug)]
pub enum AmaltheaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No images loaded")]
    NoImages,

    #[error("Tag must not be empty")]
    EmptyTag,

    #[error("Tag must not contain a comma: {0:?}")]
    InvalidTag(String),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Export folder is inside the working folder: {0}")]
    ExportIntoWorkingFolder(PathBuf),

    #[error("Image not in working folder: {0}")]
    NotInCollection(PathBuf),
}

/// A single file that an operation over many files could not handle
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl FileFailure {
    pub fn new(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
