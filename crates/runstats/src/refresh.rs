//! Drift detection from refresh logs.

use crate::transcript::{Transcript, strip_ansi};
use std::path::Path;

/// Printed when refreshed state matches the configuration.
pub const NO_CHANGES: &str = "No changes. Your infrastructure still matches the configuration.";

/// Printed for every resource Terraform refreshes.
pub const REFRESHING_STATE: &str = "Refreshing state...";

/// Decide whether a refresh transcript indicates drift.
///
/// The no-changes confirmation is authoritative. Without it, any refresh
/// activity is conservatively taken as drift, which over-reports when a
/// log is truncated before the confirmation is printed.
pub fn detect_drift(transcript: &Transcript) -> bool {
    let text = strip_ansi(transcript.text());

    if text.contains(NO_CHANGES) {
        return false;
    }
    text.contains(REFRESHING_STATE)
}

/// Drift detection for a refresh log on disk.
///
/// An unavailable log never blocks publication; it reports no drift.
pub fn detect_drift_file(path: &Path) -> bool {
    match Transcript::read(path) {
        Ok(transcript) => detect_drift(&transcript),
        Err(e) => {
            log::warn!("could not read refresh log, assuming no drift: {e}");
            false
        }
    }
}
