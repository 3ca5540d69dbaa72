//! Error types for colormgmt
//!
//! Errors only surface on construction paths (opening profiles, building
//! native transforms, loading configuration). Applying a transform and
//! querying the pool report failure through `bool` and null handles.

use crate::format::ColorFormat;
use thiserror::Error;

/// Result type for colormgmt operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building color management objects
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to parse ICC profile
    #[error("Profile parse error: {0}")]
    ProfileParse(String),

    /// Profile handle is null or otherwise unusable
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    /// Profile color space does not fit the requested pixel format
    #[error("Unsupported color space: {0}")]
    UnsupportedColorSpace(String),

    /// Pixel format cannot be handled by the engine
    #[error("Unsupported pixel format: {0:?}")]
    UnsupportedFormat(ColorFormat),

    /// Native transform creation failed
    #[error("Transform error: {0}")]
    Transform(String),

    /// Object was created by another engine
    #[error("Engine mismatch: expected engine {expected}, got {actual}")]
    EngineMismatch { expected: i32, actual: i32 },

    /// Buffer size mismatch
    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
