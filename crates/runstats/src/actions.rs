//! Classification of planned resource actions.
//!
//! Terraform describes each planned change as a short list of actions.
//! A replacement shows up as `["delete", "create"]` (or the reverse for
//! `create_before_destroy`), so a single record can land in more than one
//! bucket and must be counted in each of them.

use crate::types::{ResourceChange, Tally};

/// Action names as they appear in `resource_changes[].change.actions`.
pub mod action {
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
    pub const IMPORT: &str = "import";
}

/// Buckets a single resource change falls into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    pub add: bool,
    pub change: bool,
    pub destroy: bool,
    pub import: bool,
    /// The record looks like an unattended drift correction.
    pub drift: bool,
}

/// Classify one action list by membership.
pub fn classify<S: AsRef<str>>(actions: &[S]) -> Classification {
    let has = |name: &str| actions.iter().any(|a| a.as_ref() == name);

    Classification {
        add: has(action::CREATE),
        change: has(action::UPDATE),
        destroy: has(action::DELETE),
        import: has(action::IMPORT),
        drift: is_drift_only(actions),
    }
}

/// Whether an action list is treated as drift.
///
/// This is a heuristic: an in-place update that is the only action on a
/// resource is assumed to be Terraform reconciling out-of-band edits. It
/// does not look at the rest of the plan, so an ordinary update that
/// happens to be the sole action on its resource is counted too, and
/// drift that Terraform resolves by replacement is not.
pub fn is_drift_only<S: AsRef<str>>(actions: &[S]) -> bool {
    matches!(actions, [only] if only.as_ref() == action::UPDATE)
}

/// Running totals over a sequence of resource changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionTally {
    tally: Tally,
    drift: u64,
}

impl ActionTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one resource change.
    pub fn record(&mut self, change: &ResourceChange) {
        let class = classify(&change.actions);

        self.tally.total += 1;
        self.tally.added += u64::from(class.add);
        self.tally.changed += u64::from(class.change);
        self.tally.destroyed += u64::from(class.destroy);
        self.tally.imported += u64::from(class.import);
        self.drift += u64::from(class.drift);

        if class.drift {
            log::debug!(
                "drift-only update on {}",
                change.address.as_deref().unwrap_or(&change.resource_type)
            );
        }
    }

    /// Counts accumulated so far.
    pub fn tally(&self) -> Tally {
        self.tally
    }

    /// Number of records that matched the drift heuristic.
    pub fn drift_count(&self) -> u64 {
        self.drift
    }
}

impl<'a> FromIterator<&'a ResourceChange> for ActionTally {
    fn from_iter<I: IntoIterator<Item = &'a ResourceChange>>(iter: I) -> Self {
        let mut tally = Self::new();
        for change in iter {
            tally.record(change);
        }
        tally
    }
}
