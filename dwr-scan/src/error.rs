//! Error types for dwr-scan
//!
//! Two severities:
//! - [`ScanError`]: fatal configuration-level failures, abort the run
//! - [`ValidationError`]: per-file failures, the file is skipped and the scan continues

use std::path::PathBuf;
use thiserror::Error;

/// Fatal scan errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Root directory does not exist
    #[error("Root directory not found: {0}")]
    RootNotFound(PathBuf),

    /// Root path exists but is not a directory
    #[error("Root is not a directory: {0}")]
    RootNotADirectory(PathBuf),

    /// Root directory cannot be listed
    #[error("Root directory unreadable {0}: {1}")]
    RootUnreadable(PathBuf, String),

    /// Output artifact location cannot be written
    #[error("Output path not writable {0}: {1}")]
    OutputNotWritable(PathBuf, String),

    /// Invalid or missing configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// dwr-common error
    #[error(transparent)]
    Common(#[from] dwr_common::Error),
}

/// Per-file validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Path does not exist
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Path exists but is a directory or special file
    #[error("Not a regular file: {0}")]
    NotARegularFile(PathBuf),

    /// Metadata could not be read
    #[error("File unreadable {0}: {1}")]
    Unreadable(PathBuf, String),

    /// Zero-length file (empty or corrupt sample)
    #[error("Empty file: {0}")]
    Empty(PathBuf),

    /// No drone-type token could be extracted from the path
    #[error("No drone label in path: {0}")]
    LabelMissing(PathBuf),
}

impl ValidationError {
    /// Path the failure refers to
    pub fn path(&self) -> &PathBuf {
        match self {
            ValidationError::NotFound(p)
            | ValidationError::NotARegularFile(p)
            | ValidationError::Unreadable(p, _)
            | ValidationError::Empty(p)
            | ValidationError::LabelMissing(p) => p,
        }
    }
}
