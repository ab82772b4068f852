//! Run outcome classification from error markers.

use crate::transcript::{Transcript, strip_ansi};
use std::fmt;
use std::path::Path;

/// Plain error prefix (`Error: ...`).
pub const ERROR_MARKER: &str = "Error:";

/// Error block drawn by Terraform's styled diagnostics renderer.
pub const BOXED_ERROR_MARKER: &str = "│ Error";

/// Result of inspecting the latest transcript of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No error marker was found.
    Succeeded,
    /// An error marker was found.
    Failed,
    /// The transcript could not be read.
    Unreadable,
}

impl Outcome {
    /// Only a readable transcript without error markers counts as success.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::Unreadable => write!(f, "unreadable"),
        }
    }
}

/// Whether a line carries an error marker.
pub fn is_error_line(line: &str) -> bool {
    line.contains(ERROR_MARKER) || line.contains(BOXED_ERROR_MARKER)
}

/// Classify a transcript, stopping at the first error marker.
pub fn classify(transcript: &Transcript) -> Outcome {
    match transcript
        .lines()
        .map(strip_ansi)
        .find(|line| is_error_line(line))
    {
        Some(line) => {
            log::debug!("error marker found: {}", line.trim());
            Outcome::Failed
        }
        None => Outcome::Succeeded,
    }
}

/// Classify a transcript on disk.
pub fn classify_file(path: &Path) -> Outcome {
    match Transcript::read(path) {
        Ok(transcript) => classify(&transcript),
        Err(e) => {
            log::warn!("could not read transcript for outcome: {e}");
            Outcome::Unreadable
        }
    }
}
