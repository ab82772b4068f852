//! Publisher trait and implementations.
//!
//! [`http::PushClient`] talks to a real Pushgateway. Use
//! [`MockPublisher`] in tests:
//!
//! ```
//! use pushgateway::publisher::{MockPublisher, Publisher};
//! use pushgateway::{Batch, Sample};
//!
//! let mock = MockPublisher::new();
//! let mut batch = Batch::new("terraform");
//! batch.push(Sample::gauge("terraform_result", "1=success, 0=failure", 1.0));
//!
//! mock.publish(&batch).unwrap();
//! assert_eq!(mock.published().len(), 1);
//! ```

pub mod http;

use crate::error::{Error, Result};
use crate::types::Batch;
use std::sync::{Arc, Mutex};

/// A sink that accepts a whole batch or nothing.
pub trait Publisher {
    /// Publish a batch, replacing any metrics previously pushed under the
    /// same grouping key.
    fn publish(&self, batch: &Batch) -> Result<()>;
}

/// In-memory publisher for tests.
#[derive(Debug, Clone, Default)]
pub struct MockPublisher {
    published: Arc<Mutex<Vec<Batch>>>,
    failure: Arc<Mutex<Option<(String, Option<u16>)>>>,
}

impl MockPublisher {
    /// Create a publisher that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent publish fail with an HTTP error.
    pub fn fail_with(&self, message: impl Into<String>, status: Option<u16>) {
        *self.failure.lock().unwrap() = Some((message.into(), status));
    }

    /// Batches published so far.
    pub fn published(&self) -> Vec<Batch> {
        self.published.lock().unwrap().clone()
    }
}

impl Publisher for MockPublisher {
    fn publish(&self, batch: &Batch) -> Result<()> {
        batch.validate()?;

        if let Some((message, status)) = self.failure.lock().unwrap().clone() {
            return Err(Error::http(message, status));
        }

        self.published.lock().unwrap().push(batch.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sample;

    fn batch() -> Batch {
        let mut batch = Batch::new("terraform");
        batch.push(Sample::gauge("terraform_result", "1=success, 0=failure", 1.0));
        batch
    }

    #[test]
    fn test_mock_records_batches() {
        let mock = MockPublisher::new();
        mock.publish(&batch()).unwrap();
        mock.publish(&batch()).unwrap();
        assert_eq!(mock.published().len(), 2);
    }

    #[test]
    fn test_mock_failure_publishes_nothing() {
        let mock = MockPublisher::new();
        mock.fail_with("connection refused", None);

        let err = mock.publish(&batch()).unwrap_err();
        assert!(err.is_retryable());
        assert!(mock.published().is_empty());
    }

    #[test]
    fn test_mock_validates() {
        let mock = MockPublisher::new();
        let mut invalid = batch();
        invalid.push(Sample::gauge("terraform_result", "", 0.0));

        assert!(mock.publish(&invalid).is_err());
        assert!(mock.published().is_empty());
    }
}
