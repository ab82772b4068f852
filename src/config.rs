use anyhow::{Context, Result, bail};
use chrono::{DateTime, TimeZone, Utc};
use pushgateway::{Grouping, RetryConfig};
use std::time::Duration;

use crate::cli::PushArgs;

/// Port the Pushgateway listens on by default.
pub const DEFAULT_GATEWAY_PORT: u16 = 9091;

// ============================================================================
// Gateway
// ============================================================================

/// Normalize a gateway setting into a base URL.
///
/// `pushgateway` becomes `http://pushgateway:9091`; anything with a scheme is
/// used as given.
pub fn gateway_url(raw: &str) -> Result<String> {
    let raw = raw.trim().trim_end_matches('/');
    if raw.is_empty() {
        bail!("Pushgateway address is empty");
    }

    if raw.contains("://") {
        return Ok(raw.to_string());
    }

    let has_port = raw
        .rsplit_once(':')
        .is_some_and(|(_, port)| !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()));
    if has_port {
        Ok(format!("http://{raw}"))
    } else {
        Ok(format!("http://{raw}:{DEFAULT_GATEWAY_PORT}"))
    }
}

/// Grouping labels for a CI run.
pub fn grouping(args: &PushArgs) -> Grouping {
    Grouping::new()
        .label_opt("instance", args.instance.as_deref())
        .label_opt("commit_message", args.commit_message.as_deref())
        .label_opt("workflow_name", args.workflow.as_deref())
}

/// Retry policy for `--retries` attempts.
pub fn retry_config(attempts: u32) -> RetryConfig {
    RetryConfig::new(attempts.max(1), Duration::from_secs(2), 2.0)
}

// ============================================================================
// Start Time
// ============================================================================

/// Parse a run start time given as Unix seconds or RFC3339.
pub fn parse_start_time(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(secs) = raw.parse::<i64>() {
        return Utc
            .timestamp_opt(secs, 0)
            .single()
            .with_context(|| format!("Start time out of range: {raw}"));
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .with_context(|| format!("Invalid start time '{raw}' (expected Unix seconds or RFC3339)"))
}

/// Resolve the start time, falling back to `now` when unset or invalid.
///
/// Only the duration gauge depends on it, so a bad value is reported and
/// the run is still published.
pub fn start_time_or(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => parse_start_time(raw).unwrap_or_else(|e| {
            log::warn!("{e:#}; execution duration covers only this process");
            now
        }),
        _ => {
            log::warn!("no start time given, execution duration covers only this process");
            now
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_args() -> PushArgs {
        PushArgs {
            gateway: None,
            job: "terraform".to_string(),
            instance: Some("1234".to_string()),
            workflow: Some("deploy".to_string()),
            commit_message: Some(String::new()),
            retries: 3,
            dry_run: false,
        }
    }

    #[test]
    fn test_gateway_url_bare_host() {
        assert_eq!(
            gateway_url("pushgateway").unwrap(),
            "http://pushgateway:9091"
        );
        assert_eq!(gateway_url("10.0.0.5").unwrap(), "http://10.0.0.5:9091");
    }

    #[test]
    fn test_gateway_url_with_port() {
        assert_eq!(
            gateway_url("pushgateway:19091").unwrap(),
            "http://pushgateway:19091"
        );
    }

    #[test]
    fn test_gateway_url_with_scheme() {
        assert_eq!(
            gateway_url("https://push.example.com/").unwrap(),
            "https://push.example.com"
        );
    }

    #[test]
    fn test_gateway_url_empty() {
        assert!(gateway_url("  ").is_err());
    }

    #[test]
    fn test_grouping_skips_empty_labels() {
        let grouping = grouping(&push_args());
        let labels: Vec<_> = grouping.iter().collect();
        assert_eq!(
            labels,
            vec![("instance", "1234"), ("workflow_name", "deploy")]
        );
    }

    #[test]
    fn test_parse_start_time_unix() {
        let ts = parse_start_time("1714564800").unwrap();
        assert_eq!(ts.timestamp(), 1_714_564_800);
    }

    #[test]
    fn test_parse_start_time_rfc3339() {
        let ts = parse_start_time("2024-05-01T12:00:00Z").unwrap();
        assert_eq!(ts.timestamp(), 1_714_564_800);
    }

    #[test]
    fn test_parse_start_time_invalid() {
        assert!(parse_start_time("noon").is_err());
    }

    #[test]
    fn test_start_time_fallback() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(start_time_or(None, now), now);
        assert_eq!(start_time_or(Some(""), now), now);
        assert_eq!(
            start_time_or(Some("1714564700"), now).timestamp(),
            1_714_564_700
        );
    }

    #[test]
    fn test_start_time_invalid_falls_back() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(start_time_or(Some("2024-05-01 12:00:00"), now), now);
        assert_eq!(start_time_or(Some("noon"), now), now);
    }

    #[test]
    fn test_retry_config_minimum() {
        assert_eq!(retry_config(0).max_attempts, 1);
        assert_eq!(retry_config(5).max_attempts, 5);
    }
}
