// SPDX-License-Identifier: MPL-2.0

//! Error types for the scroll background engine

use std::fmt;
use std::path::PathBuf;

/// Result type alias using ScrollError
pub type ScrollResult<T> = Result<T, ScrollError>;

/// Main error type
#[derive(Debug, Clone)]
pub enum ScrollError {
    /// An image could not be read or decoded
    AssetLoad {
        /// Path of the offending image
        path: PathBuf,
        /// Decoder or filesystem message
        reason: String,
    },
    /// The image directory contains no candidate images
    EmptyDirectory(PathBuf),
    /// The image directory does not exist
    DirectoryNotFound(PathBuf),
    /// A completion or tick callback panicked
    Callback(String),
    /// Configuration errors
    Config(String),
    /// Filesystem errors outside of image decoding
    Io(String),
}

impl ScrollError {
    /// Build an asset load error for `path`
    pub fn asset(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        ScrollError::AssetLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for ScrollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrollError::AssetLoad { path, reason } => {
                write!(f, "Cannot load image {}: {}", path.display(), reason)
            }
            ScrollError::EmptyDirectory(dir) => {
                write!(f, "No images found in {}", dir.display())
            }
            ScrollError::DirectoryNotFound(dir) => {
                write!(f, "Image directory not found: {}", dir.display())
            }
            ScrollError::Callback(msg) => write!(f, "Callback failed: {}", msg),
            ScrollError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ScrollError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for ScrollError {}

impl From<std::io::Error> for ScrollError {
    fn from(err: std::io::Error) -> Self {
        ScrollError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ScrollError {
    fn from(err: serde_json::Error) -> Self {
        ScrollError::Config(err.to_string())
    }
}

/// Turn a caught panic payload into a readable callback error
pub fn callback_error(payload: Box<dyn std::any::Any + Send>) -> ScrollError {
    let msg = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    };
    ScrollError::Callback(msg)
}
