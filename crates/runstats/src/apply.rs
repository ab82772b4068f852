//! Apply log interpretation.
//!
//! A successful `terraform apply` ends with a summary line such as:
//! ```text
//! Apply complete! Resources: 1 added, 0 changed, 0 destroyed.
//! Apply complete! Resources: 1 imported, 0 added, 2 changed, 0 destroyed.
//! ```
//! The clause order and the presence of `imported` vary between Terraform
//! versions, so each `<count> <keyword>` segment is matched on its own and
//! anything unrecognised is skipped.

use crate::transcript::{Transcript, strip_ansi};
use crate::types::ApplyStats;
use std::path::Path;

/// Marker that opens the apply summary line.
pub const APPLY_COMPLETE: &str = "Apply complete!";

/// Extract actual change counts from an apply transcript.
///
/// All counts stay zero when the summary line never appears, which is also
/// what a failed apply looks like. Pair this with
/// [`outcome::classify`](crate::outcome::classify) to tell the two apart.
pub fn parse(transcript: &Transcript) -> ApplyStats {
    let mut stats = ApplyStats::default();

    for line in transcript.lines() {
        let line = strip_ansi(line);
        let Some((_, rest)) = line.split_once(APPLY_COMPLETE) else {
            continue;
        };
        let Some((_, clause)) = rest.split_once(':') else {
            continue;
        };

        for segment in clause.split(',') {
            apply_segment(&mut stats, segment);
        }
    }

    stats
}

/// Extract change counts from an apply log on disk.
///
/// A missing or unreadable log is treated like an apply that never
/// completed.
pub fn parse_file(path: &Path) -> ApplyStats {
    match Transcript::read(path) {
        Ok(transcript) => parse(&transcript),
        Err(e) => {
            log::warn!("could not read apply log: {e}");
            ApplyStats::default()
        }
    }
}

/// Route one `"<count> <keyword>"` segment into its bucket.
fn apply_segment(stats: &mut ApplyStats, segment: &str) {
    let mut parts = segment.split_whitespace();
    let (Some(count), Some(keyword)) = (parts.next(), parts.next()) else {
        return;
    };
    let Ok(count) = count.parse::<u64>() else {
        log::debug!("skipping apply summary segment {segment:?}");
        return;
    };

    match keyword.trim_end_matches(|c: char| c.is_ascii_punctuation()) {
        "added" => stats.added = count,
        "changed" => stats.changed = count,
        "destroyed" => stats.destroyed = count,
        "imported" => stats.imported = count,
        other => log::debug!("skipping unknown apply summary keyword {other:?}"),
    }
}
