//! Error types for pagesnap
//!
//! This module provides the error type hierarchy using `thiserror`.
//! Configuration and session-launch errors are fatal and abort a run;
//! navigation, capture, and storage errors are caught at the per-target
//! boundary by the runner and recorded as failed results.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for pagesnap operations
#[derive(Error, Debug)]
pub enum Error {
    /// Job configuration errors (fatal, surfaced before any navigation)
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Browser session lifecycle errors (fatal, no session means no capture)
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Navigation errors
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Capture errors
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Output storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ChromiumOxide errors
    #[error("CDP error: {0}")]
    Cdp(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Job configuration validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The target list is empty
    #[error("Job has no targets")]
    NoTargets,

    /// Two targets share the same output filename
    #[error("Duplicate target filename: {0}")]
    DuplicateFilename(String),

    /// A target URL is not usable for navigation
    #[error("Invalid target URL {url}: {reason}")]
    InvalidUrl {
        /// The offending URL
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// A target filename is not a safe relative path
    #[error("Invalid target filename {filename}: {reason}")]
    InvalidFilename {
        /// The offending filename
        filename: String,
        /// Why it was rejected
        reason: String,
    },

    /// Viewport width or height is zero
    #[error("Viewport dimensions must be non-zero")]
    ZeroViewport,

    /// The output directory cannot be used
    #[error("Output directory {path} unusable: {source}")]
    OutputDir {
        /// The configured output directory
        path: PathBuf,
        /// The underlying storage failure
        source: StorageError,
    },

    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        /// The config file path
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// Config file could not be parsed
    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        /// The config file path
        path: PathBuf,
        /// The underlying JSON error
        source: serde_json::Error,
    },
}

/// Browser session lifecycle errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// Failed to launch the browser
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Invalid launch configuration
    #[error("Invalid browser configuration: {0}")]
    InvalidConfig(String),

    /// Failed to create the page
    #[error("Failed to create page: {0}")]
    PageCreationFailed(String),

    /// Session teardown failed
    #[error("Failed to close browser: {0}")]
    CloseFailed(String),
}

/// Navigation errors
#[derive(Error, Debug)]
pub enum NavigationError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Navigation timeout
    #[error("Navigation timed out after {0}ms")]
    Timeout(u64),

    /// Page load failed
    #[error("Page load failed: {0}")]
    LoadFailed(String),
}

/// Capture errors
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Screenshot failed
    #[error("Screenshot capture failed: {0}")]
    ScreenshotFailed(String),

    /// The browser returned an empty capture
    #[error("Screenshot capture returned no data")]
    EmptyCapture,
}

/// Output storage errors
///
/// Variants are kept distinguishable so diagnostics can tell a permissions
/// problem from a full disk from a malformed path.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Directory or file is not writable
    #[error("Not writable: {path}: {source}")]
    NotWritable {
        /// The path that could not be written
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// The filesystem is out of space
    #[error("Disk full writing {path}")]
    DiskFull {
        /// The path being written when space ran out
        path: PathBuf,
    },

    /// The path is malformed or escapes the output directory
    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    /// Directory creation failed
    #[error("Failed to create directory {path}: {source}")]
    CreateDirFailed {
        /// The directory that could not be created
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// File write failed for another reason
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        /// The file that could not be written
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },
}

/// Result type alias for pagesnap operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }

    /// Create a CDP error from a string
    pub fn cdp<S: Into<String>>(msg: S) -> Self {
        Error::Cdp(msg.into())
    }
}

/// Convert chromiumoxide errors
impl From<chromiumoxide::error::CdpError> for Error {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Error::Cdp(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Session(SessionError::LaunchFailed("no chrome".to_string()));
        assert!(err.to_string().contains("Failed to launch browser"));
        assert!(err.to_string().contains("no chrome"));
    }

    #[test]
    fn test_config_error_duplicate() {
        let err = ConfigError::DuplicateFilename("home.png".to_string());
        assert_eq!(err.to_string(), "Duplicate target filename: home.png");
    }

    #[test]
    fn test_navigation_timeout_display() {
        let err = NavigationError::Timeout(30000);
        assert!(err.to_string().contains("30000ms"));
    }

    #[test]
    fn test_storage_error_disk_full() {
        let err = StorageError::DiskFull {
            path: PathBuf::from("/out/home.png"),
        };
        assert!(err.to_string().contains("Disk full"));
    }

    #[test]
    fn test_generic_error() {
        let err = Error::generic("something went wrong");
        assert_eq!(err.to_string(), "something went wrong");
    }
}
