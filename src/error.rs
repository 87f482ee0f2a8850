//! Error types for the capture pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for capture operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while capturing and stitching a page
#[derive(Error, Debug)]
pub enum Error {
    /// A geometry query failed or returned a nonsensical value
    #[error("Geometry probe failed: {0}")]
    Probe(String),

    /// The page did not finish loading within its budget
    #[error("Navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    /// A scroll-capture step's output was not observable after the capture call
    #[error("Capture for fragment {index} was not persisted at {}", .path.display())]
    CaptureMissing { index: usize, path: PathBuf },

    /// Canvas allocation or a crop box fell outside valid bounds
    #[error("Composition failed: {0}")]
    Composition(String),

    /// The browser session failed or became unreachable
    #[error("Session error: {0}")]
    Session(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Filesystem error from the transient store or output directory
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decode/encode error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

#[cfg(feature = "cdp")]
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Session(err.to_string())
    }
}
