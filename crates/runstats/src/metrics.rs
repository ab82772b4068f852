//! The gauge set published for one run.
//!
//! Every metric has its own field in [`MetricSet`] and its own name
//! constant in [`names`], so a gauge cannot be written twice in one run.
//! [`MetricSet::gauges`] flattens the record for publishing.

use crate::types::{ApplyStats, Tally};

/// Gauge names as they appear at the metrics gateway.
pub mod names {
    pub const EXECUTION_DURATION_SECONDS: &str = "terraform_execution_duration_seconds";
    pub const TIMESTAMP: &str = "terraform_timestamp";
    pub const DRIFT_DETECTED: &str = "terraform_drift_detected";
    pub const RESOURCES_TOTAL: &str = "terraform_resources_total";
    pub const TO_ADD: &str = "terraform_to_add";
    pub const TO_CHANGE: &str = "terraform_to_change";
    pub const TO_DESTROY: &str = "terraform_to_destroy";
    pub const TO_IMPORT: &str = "terraform_to_import";
    pub const ADDED: &str = "terraform_added";
    pub const CHANGED: &str = "terraform_changed";
    pub const DESTROYED: &str = "terraform_destroyed";
    pub const IMPORTED: &str = "terraform_imported";
    pub const RESULT: &str = "terraform_result";
}

/// A single named gauge value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gauge {
    pub name: &'static str,
    pub help: &'static str,
    pub value: f64,
}

impl Gauge {
    const fn new(name: &'static str, help: &'static str, value: f64) -> Self {
        Self { name, help, value }
    }
}

/// All metrics derived from one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSet {
    /// Seconds between the caller-supplied start and finalization
    pub execution_duration_seconds: f64,
    /// Unix timestamp of the run
    pub timestamp: i64,
    /// Drift seen in either the plan or the refresh log
    pub drift_detected: bool,
    /// Changes the plan intends to make
    pub planned: Tally,
    /// Changes the apply reported, when an apply log was configured
    pub actual: Option<ApplyStats>,
    /// Whether the latest stage finished without errors
    pub success: bool,
}

impl MetricSet {
    /// Flatten into gauges in a stable order.
    pub fn gauges(&self) -> Vec<Gauge> {
        let mut gauges = vec![
            Gauge::new(
                names::EXECUTION_DURATION_SECONDS,
                "Time taken for execution",
                self.execution_duration_seconds,
            ),
            Gauge::new(names::TIMESTAMP, "Unix timestamp of run", self.timestamp as f64),
            Gauge::new(
                names::DRIFT_DETECTED,
                "Drift found during plan or refresh",
                flag(self.drift_detected),
            ),
            Gauge::new(
                names::RESOURCES_TOTAL,
                "Total planned resource changes",
                self.planned.total as f64,
            ),
            Gauge::new(
                names::TO_ADD,
                "Resources planned to be added",
                self.planned.added as f64,
            ),
            Gauge::new(
                names::TO_CHANGE,
                "Resources planned to be changed",
                self.planned.changed as f64,
            ),
            Gauge::new(
                names::TO_DESTROY,
                "Resources planned to be destroyed",
                self.planned.destroyed as f64,
            ),
            Gauge::new(
                names::TO_IMPORT,
                "Resources planned to be imported",
                self.planned.imported as f64,
            ),
        ];

        if let Some(actual) = self.actual {
            gauges.extend([
                Gauge::new(names::ADDED, "Resources actually added", actual.added as f64),
                Gauge::new(
                    names::CHANGED,
                    "Resources actually changed",
                    actual.changed as f64,
                ),
                Gauge::new(
                    names::DESTROYED,
                    "Resources actually destroyed",
                    actual.destroyed as f64,
                ),
                Gauge::new(
                    names::IMPORTED,
                    "Resources actually imported",
                    actual.imported as f64,
                ),
            ]);
        }

        gauges.push(Gauge::new(
            names::RESULT,
            "1=success, 0=failure",
            flag(self.success),
        ));
        gauges
    }
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}
