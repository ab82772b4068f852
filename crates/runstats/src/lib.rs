//! # runstats
//!
//! Derive run metrics from the artifacts of a Terraform run.
//!
//! This crate provides functionality for:
//! - Tallying planned resource changes from `terraform show -json` output
//! - Extracting actual change counts from an apply log
//! - Detecting drift from a plan or a refresh log
//! - Classifying a run as succeeded or failed from its latest transcript
//! - Assembling everything into a [`MetricSet`] of named gauges
//!
//! ## Example
//!
//! ```no_run
//! use chrono::Utc;
//! use runstats::{RunInputs, collect};
//!
//! let inputs = RunInputs::new("plan.json", Utc::now())
//!     .with_apply_log("apply.log")
//!     .with_refresh_log("refresh.log");
//!
//! let metrics = collect(&inputs).expect("plan could not be decoded");
//! for gauge in metrics.gauges() {
//!     println!("{} {}", gauge.name, gauge.value);
//! }
//! ```
//!
//! ## Degradation
//!
//! Missing or garbled inputs lower the affected gauges to zero/false
//! instead of failing the run. The only error [`collect()`] returns is an
//! undecodable plan, and only when [`RunInputs::strict_plan`] is set.

#![warn(clippy::all)]

pub mod actions;
pub mod apply;
pub mod collect;
pub mod error;
pub mod metrics;
pub mod outcome;
pub mod plan;
pub mod refresh;
pub mod transcript;
pub mod types;

pub use actions::{ActionTally, Classification, classify};
pub use collect::{RunInputs, collect, collect_at};
pub use error::{Error, ErrorCategory, Result};
pub use metrics::{Gauge, MetricSet};
pub use outcome::Outcome;
pub use plan::PlanSummary;
pub use transcript::Transcript;
pub use types::{ApplyStats, PlanDocument, ResourceChange, Tally};
