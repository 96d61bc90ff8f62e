//! Error taxonomy for canvas operations.
//!
//! Path validation happens before the engine is involved, so a missing file
//! or a directory never reaches the decoder. Everything the engine rejects
//! surfaces as [`CanvasError::Engine`] carrying the engine's own diagnostic.

use crate::config::ConfigError;
use crate::imaging::BackendError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for canvas operations.
pub type Result<T> = std::result::Result<T, CanvasError>;

#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("Could not open \"{}\": no such file", .0.display())]
    NotFound(PathBuf),
    #[error("Could not open \"{}\": it's a directory", .0.display())]
    IsDirectory(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Engine error: {message}")]
    Engine { message: String },
    #[error("No orientation data found in image")]
    NoOrientationData,
    #[error("Drawing stack is empty")]
    EmptyDrawingStack,
    #[error("Nothing to destroy")]
    NothingToDestroy,
    #[error("Canvas has been destroyed")]
    Destroyed,
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CanvasError {
    /// Build an engine error, preferring the diagnostic drained from the
    /// raster handle over the adapter's status error.
    pub(crate) fn engine(drained: Option<String>, status: BackendError) -> Self {
        let message = match drained {
            Some(message) if !message.trim().is_empty() => message,
            _ => status.to_string(),
        };
        CanvasError::Engine { message }
    }
}
