//! Per-request serving errors.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a request could not be served from the filesystem.
///
/// All variants drive the 404 fallback chain; they differ only in how they
/// are reported to the operator.
#[derive(Error, Debug)]
pub enum ServeError {
    /// The resolved file does not exist or is not a regular file.
    #[error("Could not find resource {}", .0.display())]
    NotFound(PathBuf),

    /// The request path would resolve outside the served root.
    #[error("Refusing to serve path outside root: {0}")]
    OutsideRoot(String),

    /// The request path could not be decoded.
    #[error("Malformed request path: {0}")]
    MalformedPath(String),

    /// The file exists but could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ServeError {
    /// Wrap an IO error, folding missing paths (including a file used as a
    /// directory) into [`ServeError::NotFound`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            ErrorKind::NotFound | ErrorKind::NotADirectory => ServeError::NotFound(path),
            _ => ServeError::Io { path, source },
        }
    }

    /// Whether this is an ordinary missing resource rather than an
    /// unexpected failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServeError::NotFound(_))
    }
}
