//! Wire encoding for Pushgateway requests.
//!
//! Samples are registered as gauges in a fresh [`Registry`] and rendered
//! with the Prometheus [`TextEncoder`], so metric names and help strings
//! are checked by the same code that formats them.
//!
//! Grouping key values go in the URL path. Every value is base64url
//! encoded with the `@base64` suffix, so commit messages and workflow names
//! containing `/` or spaces need no further escaping.

use crate::error::{Error, Result};
use crate::types::{Batch, Sample};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use prometheus::{Encoder, Gauge, Opts, Registry, TextEncoder};
use std::fmt::Write;

/// Register every sample as a gauge in a registry of its own.
///
/// Fails on an invalid metric name, an empty help string or a metric
/// that appears twice.
pub fn registry(samples: &[Sample]) -> Result<Registry> {
    let registry = Registry::new();

    for sample in samples {
        let gauge = Gauge::with_opts(Opts::new(sample.name.as_str(), sample.help.as_str()))
            .map_err(|e| Error::invalid_name("metric", &sample.name, &e))?;
        gauge.set(sample.value);

        registry
            .register(Box::new(gauge))
            .map_err(|e| match e {
                prometheus::Error::AlreadyReg => Error::DuplicateMetric(sample.name.clone()),
                other => Error::invalid_name("metric", &sample.name, &other),
            })?;
    }

    Ok(registry)
}

/// Encode samples in the text exposition format.
pub fn encode_text(samples: &[Sample]) -> Result<String> {
    let families = registry(samples)?.gather();

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&families, &mut buffer)
        .map_err(|e| Error::Encode(e.to_string()))?;

    String::from_utf8(buffer).map_err(|e| Error::Encode(e.to_string()))
}

/// Content type of the exposition body.
pub fn content_type() -> String {
    TextEncoder::new().format_type().to_string()
}

/// Build the grouping key path: `/metrics/job@base64/<job>/<label>@base64/<value>...`
pub fn grouping_path(batch: &Batch) -> String {
    let mut path = format!("/metrics/job@base64/{}", encode_path_value(&batch.job));
    for (name, value) in batch.grouping.iter() {
        if name == "job" {
            continue;
        }
        let _ = write!(path, "/{}@base64/{}", name, encode_path_value(value));
    }
    path
}

/// Base64url-encode a path value. An empty value is written as `=`.
pub fn encode_path_value(value: &str) -> String {
    if value.is_empty() {
        return "=".to_string();
    }
    URL_SAFE_NO_PAD.encode(value)
}
