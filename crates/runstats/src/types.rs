//! Core types for runstats.

use chrono::{DateTime, Utc};

// ============================================================================
// Plan Types
// ============================================================================

/// One planned change for one resource instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceChange {
    /// Resource type (e.g., "aws_s3_bucket")
    pub resource_type: String,
    /// Resource address (e.g., "aws_s3_bucket.logs"), when present
    pub address: Option<String>,
    /// Actions as emitted by Terraform (e.g., ["delete", "create"])
    pub actions: Vec<String>,
}

impl ResourceChange {
    /// Create a resource change with the given actions.
    pub fn new<S: AsRef<str>>(resource_type: impl Into<String>, actions: &[S]) -> Self {
        Self {
            resource_type: resource_type.into(),
            address: None,
            actions: actions.iter().map(|a| a.as_ref().to_string()).collect(),
        }
    }
}

/// A decoded `terraform show -json` plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanDocument {
    /// RFC3339 timestamp of the plan, if provided
    pub timestamp: Option<String>,
    /// Planned resource changes in document order
    pub resource_changes: Vec<ResourceChange>,
}

impl PlanDocument {
    /// An empty plan (no timestamp, no changes).
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the document timestamp, if present and valid RFC3339.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?;
        match DateTime::parse_from_rfc3339(raw) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(e) => {
                log::debug!("ignoring unparseable plan timestamp {raw:?}: {e}");
                None
            }
        }
    }
}

// ============================================================================
// Counts
// ============================================================================

/// Planned change counts derived from a plan document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Number of resource change records
    pub total: u64,
    /// Records containing a `create` action
    pub added: u64,
    /// Records containing an `update` action
    pub changed: u64,
    /// Records containing a `delete` action
    pub destroyed: u64,
    /// Records containing an `import` action
    pub imported: u64,
}

/// Actual change counts reported by a completed apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    pub added: u64,
    pub changed: u64,
    pub destroyed: u64,
    pub imported: u64,
}

impl ApplyStats {
    /// Create stats from the three counts every summary line carries.
    pub fn new(added: u64, changed: u64, destroyed: u64) -> Self {
        Self {
            added,
            changed,
            destroyed,
            imported: 0,
        }
    }
}
