// src/error.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

/// Errors produced by remedy operations
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Manifest error: {0}")]
    Manifest(#[from] crate::manifest::ManifestError),

    #[error("Invalid version constraint '{constraint}': {reason}")]
    InvalidConstraint { constraint: String, reason: String },

    #[error(
        "Patch {patch} must be installed, but condition {index} relies on package {target}, which is not present"
    )]
    MissingConditionTarget {
        patch: String,
        index: usize,
        target: String,
    },

    #[error("Package {0} disappeared between resolution and installation")]
    StateDesync(String),

    #[error("Package {0} has no dist source to reinstall from")]
    MissingDist(String),

    #[error("Checksum mismatch for {0}")]
    ChecksumMismatch(String),

    #[error("Download failed for '{package}' from '{url}': {reason}")]
    DownloadError {
        package: String,
        url: String,
        reason: String,
    },

    #[error("Patch tool not found: {0}")]
    ToolNotFound(String),

    #[error("Unable to apply patch \"{0}\"")]
    ApplyFailed(String),
}

/// Result type for remedy operations
pub type Result<T> = std::result::Result<T, Error>;
