//! Error types for subvol_core.

use thiserror::Error;

/// Result type alias using subvol_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the codec.
///
/// Only the path operations fail loudly. Handle and omap derivations report
/// failure through empty outputs instead, so they never produce this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Path has no `/` separator at all.
    #[error("failed to get name from subvolumepath: {path}")]
    InvalidPath { path: String },

    /// Path does not follow the `/volumes/<group>/<name>/<uuid>` layout.
    #[error("Invalid subvolume path {path}: {reason}")]
    InvalidSubvolumePath { path: String, reason: String },
}

impl Error {
    /// Create an InvalidPath error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Error::InvalidPath { path: path.into() }
    }

    /// Create an InvalidSubvolumePath error.
    pub fn invalid_subvolume_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidSubvolumePath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
