//! Plan document loading and interpretation.
//!
//! Reads the JSON produced by `terraform show -json <planfile>`:
//! ```text
//! {
//!   "timestamp": "2024-05-01T12:00:00Z",
//!   "resource_changes": [
//!     { "address": "aws_s3_bucket.logs", "type": "aws_s3_bucket",
//!       "change": { "actions": ["create"] } }
//!   ]
//! }
//! ```
//!
//! Decoding is tolerant: only input that is not a JSON object is an error.
//! Fields with an unexpected shape are skipped so that a format change in
//! one part of the document does not cost every metric.

use crate::actions::ActionTally;
use crate::error::{Error, Result};
use crate::types::{PlanDocument, ResourceChange, Tally};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;

/// Load a plan document from disk.
///
/// Returns `Ok(None)` when the file does not exist, so callers can tell an
/// absent plan apart from one that failed to decode.
pub fn load_file(path: &Path) -> Result<Option<PlanDocument>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(path, e)),
    };

    parse_slice(&bytes).map(Some).map_err(|e| e.with_path(path))
}

/// Parse a plan document from raw bytes.
pub fn parse_slice(bytes: &[u8]) -> Result<PlanDocument> {
    let value: Value = serde_json::from_slice(bytes)?;
    from_value(&value)
}

/// Parse a plan document from a string.
pub fn parse_str(content: &str) -> Result<PlanDocument> {
    parse_slice(content.as_bytes())
}

/// Build a plan document from decoded JSON.
pub fn from_value(value: &Value) -> Result<PlanDocument> {
    let Some(object) = value.as_object() else {
        return Err(Error::MalformedPlan {
            path: None,
            message: format!("expected a JSON object, found {}", json_kind(value)),
        });
    };

    let timestamp = match object.get("timestamp") {
        Some(Value::String(ts)) if !ts.is_empty() => Some(ts.clone()),
        Some(Value::String(_) | Value::Null) | None => None,
        Some(other) => {
            log::warn!("ignoring plan timestamp of type {}", json_kind(other));
            None
        }
    };

    let resource_changes = match object.get("resource_changes") {
        Some(Value::Array(items)) => items.iter().filter_map(resource_change).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            log::warn!("ignoring resource_changes of type {}", json_kind(other));
            Vec::new()
        }
    };

    Ok(PlanDocument {
        timestamp,
        resource_changes,
    })
}

/// Decode one `resource_changes` entry, skipping anything that is not an object.
fn resource_change(item: &Value) -> Option<ResourceChange> {
    let Some(object) = item.as_object() else {
        log::warn!("skipping resource change of type {}", json_kind(item));
        return None;
    };

    let resource_type = object
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let address = object
        .get("address")
        .and_then(Value::as_str)
        .map(str::to_string);
    let actions = object
        .get("change")
        .and_then(|change| change.get("actions"))
        .and_then(Value::as_array)
        .map(|actions| {
            actions
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(ResourceChange {
        resource_type,
        address,
        actions,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Interpretation
// ============================================================================

/// What a plan says about the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanSummary {
    /// Planned change counts
    pub tally: Tally,
    /// Records matching the drift-only heuristic
    pub drift_count: u64,
    /// Plan timestamp, or the time of interpretation if the plan has none
    pub timestamp: DateTime<Utc>,
}

impl PlanSummary {
    /// Whether any record looked like a drift correction.
    pub fn drift_detected(&self) -> bool {
        self.drift_count > 0
    }
}

/// Tally a plan with an explicit clock for the timestamp fallback.
pub fn interpret_at(plan: &PlanDocument, now: DateTime<Utc>) -> PlanSummary {
    let tally: ActionTally = plan.resource_changes.iter().collect();

    PlanSummary {
        tally: tally.tally(),
        drift_count: tally.drift_count(),
        timestamp: plan.parsed_timestamp().unwrap_or(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    const SAMPLE_PLAN: &str = r#"{
        "format_version": "1.2",
        "timestamp": "2024-05-01T12:00:00Z",
        "resource_changes": [
            {"address": "aws_s3_bucket.logs", "type": "aws_s3_bucket",
             "change": {"actions": ["create"]}},
            {"address": "aws_instance.web", "type": "aws_instance",
             "change": {"actions": ["update"]}},
            {"address": "aws_instance.db", "type": "aws_instance",
             "change": {"actions": ["delete", "create"]}},
            {"address": "aws_iam_role.ci", "type": "aws_iam_role",
             "change": {"actions": ["no-op"]}}
        ]
    }"#;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_sample_plan() {
        let plan = parse_str(SAMPLE_PLAN).unwrap();
        assert_eq!(plan.timestamp.as_deref(), Some("2024-05-01T12:00:00Z"));
        assert_eq!(plan.resource_changes.len(), 4);
        assert_eq!(plan.resource_changes[0].resource_type, "aws_s3_bucket");
        assert_eq!(
            plan.resource_changes[0].address.as_deref(),
            Some("aws_s3_bucket.logs")
        );
        assert_eq!(plan.resource_changes[2].actions, vec!["delete", "create"]);
    }

    #[test]
    fn test_interpret_sample_plan() {
        let plan = parse_str(SAMPLE_PLAN).unwrap();
        let summary = interpret_at(&plan, fixed_now());

        assert_eq!(
            summary.tally,
            Tally {
                total: 4,
                added: 2,
                changed: 1,
                destroyed: 1,
                imported: 0,
            }
        );
        assert_eq!(summary.drift_count, 1);
        assert!(summary.drift_detected());
        assert_eq!(summary.timestamp.timestamp(), 1_714_564_800);
    }

    #[test]
    fn test_interpret_empty_plan() {
        let summary = interpret_at(&PlanDocument::new(), fixed_now());
        assert_eq!(summary.tally, Tally::default());
        assert!(!summary.drift_detected());
        assert_eq!(summary.timestamp, fixed_now());
    }

    #[test]
    fn test_interpret_replacement_is_not_drift() {
        let plan = parse_str(
            r#"{"resource_changes": [{"type": "aws_instance", "change": {"actions": ["delete", "create"]}}]}"#,
        )
        .unwrap();
        let summary = interpret_at(&plan, fixed_now());
        assert_eq!(summary.tally.added, 1);
        assert_eq!(summary.tally.destroyed, 1);
        assert!(!summary.drift_detected());
    }

    #[test]
    fn test_interpret_is_repeatable() {
        let plan = parse_str(SAMPLE_PLAN).unwrap();
        let first = interpret_at(&plan, fixed_now());
        let second = interpret_at(&plan, fixed_now());
        assert_eq!(first, second);
    }

    #[test]
    fn test_timestamp_fallback_when_unparseable() {
        let plan = parse_str(r#"{"timestamp": "not-a-date", "resource_changes": []}"#).unwrap();
        let summary = interpret_at(&plan, fixed_now());
        assert_eq!(summary.timestamp, fixed_now());
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = parse_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::MalformedPlan { .. }));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = parse_str("[1, 2, 3]").unwrap_err();
        match err {
            Error::MalformedPlan { message, .. } => assert!(message.contains("array")),
            other => panic!("Expected MalformedPlan, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_tolerates_wrong_field_shapes() {
        let plan = parse_str(
            r#"{
                "timestamp": 1714564800,
                "resource_changes": [
                    "garbage",
                    {"type": "aws_vpc"},
                    {"type": "aws_subnet", "change": {"actions": ["update", 7, null]}},
                    {"type": 42, "change": {"actions": ["create"]}}
                ]
            }"#,
        )
        .unwrap();

        assert!(plan.timestamp.is_none());
        assert_eq!(plan.resource_changes.len(), 3);
        assert!(plan.resource_changes[0].actions.is_empty());
        assert_eq!(plan.resource_changes[1].actions, vec!["update"]);
        assert_eq!(plan.resource_changes[2].resource_type, "");

        let summary = interpret_at(&plan, fixed_now());
        assert_eq!(summary.tally.total, 3);
        assert_eq!(summary.tally.added, 1);
        assert_eq!(summary.drift_count, 1);
    }

    #[test]
    fn test_parse_resource_changes_not_array() {
        let plan = parse_str(r#"{"resource_changes": {"oops": true}}"#).unwrap();
        assert!(plan.resource_changes.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = load_file(&dir.path().join("plan.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_PLAN.as_bytes()).unwrap();

        let plan = load_file(file.path()).unwrap().unwrap();
        assert_eq!(plan.resource_changes.len(), 4);
    }

    #[test]
    fn test_load_malformed_file_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"Terraform will perform the following actions:").unwrap();

        let err = load_file(file.path()).unwrap_err();
        match err {
            Error::MalformedPlan { path, .. } => assert_eq!(path.as_deref(), Some(file.path())),
            other => panic!("Expected MalformedPlan, got {other:?}"),
        }
    }
}
