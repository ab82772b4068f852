//! Error types for Pushgateway operations.
//!
//! Errors are categorized so that a push is only retried when the failure
//! is transient. A rejected batch is never retried.

/// Result type alias for Pushgateway operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of push errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection, DNS or timeout failures, and 5xx responses.
    Network,
    /// The gateway answered with a 4xx status.
    Rejected,
    /// The batch was invalid and never sent.
    Invalid,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Pushgateway unreachable",
            Self::Rejected => "Pushgateway rejected the batch",
            Self::Invalid => "Invalid metric batch",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check PUSHGATEWAY_URL and that the gateway is reachable from CI",
            Self::Rejected => {
                "The gateway refused the metrics, check for conflicting metric types"
            }
            Self::Invalid => "Metric and label names must be valid Prometheus identifiers",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors that can occur while pushing metrics.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP request failed: {message}")]
    HttpError {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// A metric or label was rejected by the Prometheus client.
    #[error("invalid {kind} {name:?}: {reason}")]
    InvalidName {
        /// What was being named ("metric" or "label").
        kind: &'static str,
        /// The offending name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The same metric name appears twice in one batch.
    #[error("duplicate metric in batch: {0}")]
    DuplicateMetric(String),

    /// The job name is empty.
    #[error("job name must not be empty")]
    EmptyJob,

    /// The exposition body could not be rendered.
    #[error("encoding metrics failed: {0}")]
    Encode(String),
}

impl Error {
    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::HttpError {
            message: message.into(),
            status,
        }
    }

    /// Create an invalid-name error from a Prometheus client error.
    pub fn invalid_name(kind: &'static str, name: &str, reason: &prometheus::Error) -> Self {
        Self::InvalidName {
            kind,
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Get the error category for retry logic.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::HttpError {
                status: Some(code), ..
            } if (400..500).contains(code) => ErrorCategory::Rejected,
            Error::HttpError { .. } => ErrorCategory::Network,
            Error::InvalidName { .. } | Error::DuplicateMetric(_) | Error::EmptyJob => {
                ErrorCategory::Invalid
            }
            Error::Encode(_) => ErrorCategory::Other,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::HttpError {
                message: format!("HTTP {}", code),
                status: Some(code),
            },
            other => Self::HttpError {
                message: other.to_string(),
                status: None,
            },
        }
    }
}
