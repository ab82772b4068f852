//! Error types for run interpretation.
//!
//! Most inputs are interpreted leniently and never produce an error: a
//! missing log degrades to zero counts, an unreadable transcript becomes a
//! failed outcome. The errors here cover the few cases where a caller has
//! to decide what to do, chiefly a plan document that cannot be decoded.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for run interpretation.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of interpretation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input file exists but could not be read
    Unreadable,
    /// Input was read but is not in the expected format
    Malformed,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Unreadable => "Input could not be read",
            Self::Malformed => "Input is malformed",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Unreadable => "Check that the CI step wrote the file and that it is readable",
            Self::Malformed => "Generate the plan with `terraform show -json <planfile>`",
        }
    }
}

/// Errors that can occur while interpreting run artifacts.
#[derive(Debug, Error)]
pub enum Error {
    /// The plan document is not a JSON object.
    #[error("malformed plan document{}: {message}", display_path(.path))]
    MalformedPlan {
        /// Path of the plan file, if it was read from disk
        path: Option<PathBuf>,
        /// Decoder message
        message: String,
    },

    /// IO error while reading an input file.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path involved in the error
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" at {}", p.display()))
        .unwrap_or_default()
}

impl Error {
    /// Create an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Attach a file path to a plan decoding error.
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::MalformedPlan { message, .. } => Self::MalformedPlan {
                path: Some(path.into()),
                message,
            },
            Self::Io { source, .. } => Self::Io {
                path: path.into(),
                source,
            },
        }
    }

    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedPlan { .. } => ErrorCategory::Malformed,
            Self::Io { .. } => ErrorCategory::Unreadable,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedPlan {
            path: None,
            message: err.to_string(),
        }
    }
}
