//! Error types for metadata and image file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing metadata and images.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image decode or encode failure
    #[error("Image error for {path:?}: {source}")]
    Image {
        /// Path of the image being read or written
        path: PathBuf,
        /// Underlying codec error
        #[source]
        source: image::ImageError,
    },

    /// A path has no file name to derive an output name from
    #[error("Path has no file name: {path:?}")]
    MissingFileName {
        /// The offending path
        path: PathBuf,
    },
}

impl FormatError {
    /// Create an image error for `path`.
    pub fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Image {
            path: path.into(),
            source,
        }
    }
}
