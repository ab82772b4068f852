//! Core types for Pushgateway batches.

use crate::encode;
use crate::error::{Error, Result};
use prometheus::Opts;
use prometheus::core::Describer;

/// A gauge value to push.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Metric name (e.g., "terraform_result")
    pub name: String,
    /// HELP text
    pub help: String,
    /// Current value
    pub value: f64,
}

impl Sample {
    /// Create a new gauge sample.
    pub fn gauge(name: impl Into<String>, help: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            value,
        }
    }
}

/// Grouping labels that identify a batch at the gateway.
///
/// Labels keep their insertion order so the push URL is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grouping {
    labels: Vec<(String, String)>,
}

impl Grouping {
    /// Create an empty grouping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label, replacing any earlier value for the same name.
    pub fn label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.labels.retain(|(existing, _)| *existing != name);
        self.labels.push((name, value.into()));
        self
    }

    /// Add a label only if the value is present and non-empty.
    pub fn label_opt(self, name: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(value) if !value.is_empty() => self.label(name, value),
            _ => self,
        }
    }

    /// Labels in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether there are no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Everything needed for one push: job, grouping and gauges.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Job name (first grouping key segment)
    pub job: String,
    /// Additional grouping labels
    pub grouping: Grouping,
    /// Gauges to push
    pub samples: Vec<Sample>,
}

impl Batch {
    /// Create an empty batch for a job.
    pub fn new(job: impl Into<String>) -> Self {
        Self {
            job: job.into(),
            grouping: Grouping::new(),
            samples: Vec::new(),
        }
    }

    /// Set the grouping labels.
    pub fn with_grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }

    /// Add a sample.
    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// Check names and uniqueness before anything is sent.
    pub fn validate(&self) -> Result<()> {
        if self.job.is_empty() {
            return Err(Error::EmptyJob);
        }

        for (name, value) in self.grouping.iter() {
            // The job is already the first path segment.
            if name == "job" && value != self.job {
                return Err(Error::InvalidName {
                    kind: "label",
                    name: name.to_string(),
                    reason: format!("conflicts with job {:?}", self.job),
                });
            }
            if name.starts_with("__") {
                return Err(Error::InvalidName {
                    kind: "label",
                    name: name.to_string(),
                    reason: "the __ prefix is reserved".to_string(),
                });
            }
            Opts::new("grouping", "grouping key")
                .const_label(name, value)
                .describe()
                .map_err(|e| Error::invalid_name("label", name, &e))?;
        }

        encode::registry(&self.samples).map(drop)
    }
}

impl Extend<Sample> for Batch {
    fn extend<I: IntoIterator<Item = Sample>>(&mut self, iter: I) {
        self.samples.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping_replaces_duplicate_label() {
        let grouping = Grouping::new()
            .label("instance", "1")
            .label("workflow_name", "deploy")
            .label("instance", "2");

        let labels: Vec<_> = grouping.iter().collect();
        assert_eq!(labels, vec![("workflow_name", "deploy"), ("instance", "2")]);
    }

    #[test]
    fn test_grouping_label_opt() {
        let grouping = Grouping::new()
            .label_opt("instance", Some("42"))
            .label_opt("commit_message", Some(""))
            .label_opt("workflow_name", None);
        assert_eq!(grouping.len(), 1);
    }

    #[test]
    fn test_validate_ok() {
        let mut batch = Batch::new("terraform").with_grouping(Grouping::new().label("instance", "1"));
        batch.push(Sample::gauge("terraform_result", "1=success, 0=failure", 1.0));
        assert!(batch.validate().is_ok());
    }

    #[test]
    fn test_validate_duplicate_metric() {
        let mut batch = Batch::new("terraform");
        batch.extend([
            Sample::gauge("terraform_to_add", "Resources planned to be added", 1.0),
            Sample::gauge("terraform_to_add", "Resources planned to be added", 2.0),
        ]);
        assert!(matches!(batch.validate(), Err(Error::DuplicateMetric(name)) if name == "terraform_to_add"));
    }

    #[test]
    fn test_validate_invalid_names() {
        let mut batch = Batch::new("terraform");
        batch.push(Sample::gauge("terraform-result", "1=success, 0=failure", 1.0));
        assert!(matches!(batch.validate(), Err(Error::InvalidName { kind: "metric", .. })));

        let mut batch = Batch::new("terraform");
        batch.push(Sample::gauge("1metric", "starts with a digit", 1.0));
        assert!(matches!(batch.validate(), Err(Error::InvalidName { kind: "metric", .. })));

        for label in ["bad label", "ns:label", "9lives", "__name__"] {
            let batch = Batch::new("terraform").with_grouping(Grouping::new().label(label, "x"));
            assert!(
                matches!(batch.validate(), Err(Error::InvalidName { kind: "label", .. })),
                "{label} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_job_label() {
        let same = Batch::new("terraform").with_grouping(Grouping::new().label("job", "terraform"));
        assert!(same.validate().is_ok());

        let other = Batch::new("terraform").with_grouping(Grouping::new().label("job", "other"));
        assert!(matches!(other.validate(), Err(Error::InvalidName { kind: "label", .. })));
    }

    #[test]
    fn test_validate_empty_help() {
        let mut batch = Batch::new("terraform");
        batch.push(Sample::gauge("terraform_result", "", 1.0));
        assert!(matches!(batch.validate(), Err(Error::InvalidName { kind: "metric", .. })));
    }

    #[test]
    fn test_validate_empty_job() {
        assert!(matches!(Batch::new("").validate(), Err(Error::EmptyJob)));
    }
}
