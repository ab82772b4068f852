//! Assemble the metric set for one run.
//!
//! Interpreters run in a fixed order. The plan always comes first, the
//! apply and refresh logs are read only when configured, and the outcome
//! is taken from the most advanced stage available (apply log, else plan).

use crate::error::Result;
use crate::metrics::MetricSet;
use crate::outcome::{self, Outcome};
use crate::types::PlanDocument;
use crate::{apply, plan, refresh};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Artifact locations and timing for one run.
#[derive(Debug, Clone)]
pub struct RunInputs {
    /// `terraform show -json` output
    pub plan: PathBuf,
    /// Apply log, if the run reached the apply stage
    pub apply_log: Option<PathBuf>,
    /// Refresh log, if a refresh was performed
    pub refresh_log: Option<PathBuf>,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Fail on an undecodable plan instead of publishing zero counts
    pub strict_plan: bool,
}

impl RunInputs {
    pub fn new(plan: impl Into<PathBuf>, started_at: DateTime<Utc>) -> Self {
        Self {
            plan: plan.into(),
            apply_log: None,
            refresh_log: None,
            started_at,
            strict_plan: false,
        }
    }

    pub fn with_apply_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.apply_log = Some(path.into());
        self
    }

    pub fn with_refresh_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.refresh_log = Some(path.into());
        self
    }

    pub fn strict_plan(mut self, strict: bool) -> Self {
        self.strict_plan = strict;
        self
    }

    /// The transcript that represents the latest stage reached.
    pub fn latest_artifact(&self) -> &std::path::Path {
        self.apply_log.as_deref().unwrap_or(&self.plan)
    }
}

/// Collect metrics using the current time.
pub fn collect(inputs: &RunInputs) -> Result<MetricSet> {
    collect_at(inputs, Utc::now())
}

/// Collect metrics with an explicit clock.
///
/// `now` is both the timestamp fallback for plans without one and the end
/// of the measured duration.
pub fn collect_at(inputs: &RunInputs, now: DateTime<Utc>) -> Result<MetricSet> {
    let document = load_plan(inputs)?;
    let plan = plan::interpret_at(&document, now);
    log::info!(
        "plan: {} changes ({} add, {} change, {} destroy, {} import)",
        plan.tally.total,
        plan.tally.added,
        plan.tally.changed,
        plan.tally.destroyed,
        plan.tally.imported
    );

    let actual = inputs.apply_log.as_deref().map(apply::parse_file);
    if let Some(stats) = actual {
        log::info!(
            "apply: {} added, {} changed, {} destroyed, {} imported",
            stats.added,
            stats.changed,
            stats.destroyed,
            stats.imported
        );
    }

    let refresh_drift = inputs
        .refresh_log
        .as_deref()
        .is_some_and(refresh::detect_drift_file);
    let drift_detected = plan.drift_detected() || refresh_drift;
    log::info!(
        "drift: plan={} refresh={}",
        plan.drift_detected(),
        refresh_drift
    );

    let outcome = outcome::classify_file(inputs.latest_artifact());
    log::info!("outcome: {outcome}");
    if outcome == Outcome::Unreadable {
        log::warn!(
            "{} is unreadable, reporting failure",
            inputs.latest_artifact().display()
        );
    }

    Ok(MetricSet {
        execution_duration_seconds: elapsed_seconds(inputs.started_at, now),
        timestamp: plan.timestamp.timestamp(),
        drift_detected,
        planned: plan.tally,
        actual,
        success: outcome.is_success(),
    })
}

/// Load the plan, degrading to an empty document unless strict.
fn load_plan(inputs: &RunInputs) -> Result<PlanDocument> {
    match plan::load_file(&inputs.plan) {
        Ok(Some(document)) => Ok(document),
        Ok(None) => {
            log::warn!(
                "plan {} not found, reporting zero planned changes",
                inputs.plan.display()
            );
            Ok(PlanDocument::new())
        }
        Err(e) if inputs.strict_plan => Err(e),
        Err(e) => {
            log::warn!("{e}; reporting zero planned changes");
            Ok(PlanDocument::new())
        }
    }
}

/// Fractional seconds from `start` to `end`, never negative.
fn elapsed_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let elapsed = (end - start).num_milliseconds() as f64 / 1000.0;
    elapsed.max(0.0)
}
