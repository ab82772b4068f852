//! # pushgateway
//!
//! Blocking client for the Prometheus Pushgateway, for batch jobs that
//! publish a handful of gauges once and exit.
//!
//! This crate provides:
//! - Batches of gauges with ordered grouping labels
//! - Validation of metric and label names before anything is sent
//! - Text exposition encoding through the `prometheus` crate
//! - Base64 grouping key paths
//! - A [`Publisher`](publisher::Publisher) trait with HTTP and mock implementations
//! - Retry with exponential backoff for transient failures
//!
//! ## Example
//!
//! ```no_run
//! use pushgateway::publisher::Publisher;
//! use pushgateway::publisher::http::PushClient;
//! use pushgateway::{Batch, Grouping, RetryConfig, Sample};
//!
//! let client = PushClient::new("http://pushgateway:9091").with_retry(RetryConfig::default());
//!
//! let mut batch = Batch::new("terraform")
//!     .with_grouping(Grouping::new().label("instance", "1234"));
//! batch.push(Sample::gauge("terraform_result", "1=success, 0=failure", 1.0));
//!
//! client.publish(&batch).expect("push failed");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod encode;
pub mod error;
pub mod publisher;
pub mod retry;
pub mod types;

pub use error::{Error, ErrorCategory, Result};
pub use retry::RetryConfig;
pub use types::{Batch, Grouping, Sample};
