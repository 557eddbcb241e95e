//! Typed error handling for irmetrics.
//!
//! Library operations return [`IrMetricsResult`]. Per-class failures are
//! collected by the artifact writer instead of aborting the run, so the
//! variants carry enough context (class name or path) to be reported later.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for irmetrics operations.
#[derive(Error, Debug)]
pub enum IrMetricsError {
    /// Invalid classpath, output directory or configuration file.
    /// Surfaced before any analysis session starts.
    #[error("Configuration error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// A requested class is not present on the classpath.
    #[error("Class {class_name} could not be resolved: {message}")]
    Resolution { class_name: String, message: String },

    /// Cannot create a directory, or delete/write an artifact.
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// A method has no analyzable body.
    #[error("No body available for {method}")]
    BodyUnavailable { method: String },

    /// A snapshot file on the classpath could not be decoded.
    #[error("Malformed class snapshot {path}: {message}")]
    Snapshot { path: PathBuf, message: String },

    /// Metrics serialization failed.
    #[error("Serialization error for {class_name}: {message}")]
    Serialize { class_name: String, message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl IrMetricsError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an I/O error that has no underlying `std::io::Error`.
    pub fn io_message(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a resolution failure for a class name.
    pub fn resolution(class_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolution {
            class_name: class_name.into(),
            message: message.into(),
        }
    }

    /// Create a body-unavailable error for a method signature.
    pub fn body_unavailable(method: impl Into<String>) -> Self {
        Self::BodyUnavailable {
            method: method.into(),
        }
    }

    /// Create a snapshot decoding error.
    pub fn snapshot(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Snapshot {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error.
    pub fn serialize(class_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialize {
            class_name: class_name.into(),
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error only affects a single class (the run can continue).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Resolution { .. }
                | Self::BodyUnavailable { .. }
                | Self::Io { .. }
                | Self::Serialize { .. }
        )
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            Self::Snapshot { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Convenience type alias for irmetrics results.
pub type IrMetricsResult<T> = Result<T, IrMetricsError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> IrMetricsResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> IrMetricsResult<T> {
        self.map_err(|e| IrMetricsError::io(path, e))
    }
}
