use anyhow::{Context as _, Result, bail};
use chrono::Utc;
use pushgateway::publisher::Publisher;
use pushgateway::publisher::http::PushClient;
use pushgateway::{Batch, Sample};
use runstats::{MetricSet, RunInputs};

use crate::Context;
use crate::cli::{CollectArgs, PushArgs};
use crate::config;
use crate::ui;

pub fn run(ctx: &Context, args: CollectArgs) -> Result<()> {
    let now = Utc::now();
    let started_at = config::start_time_or(args.start_time.as_deref(), now);

    let mut inputs = RunInputs::new(&args.plan, started_at).strict_plan(args.strict_plan);
    if let Some(path) = &args.apply_log {
        inputs = inputs.with_apply_log(path);
    }
    if let Some(path) = &args.refresh_log {
        inputs = inputs.with_refresh_log(path);
    }

    let metrics = runstats::collect_at(&inputs, now)
        .map_err(|e| collect_error(&e))
        .with_context(|| format!("Failed to collect metrics from {}", args.plan.display()))?;

    if !ctx.quiet {
        print_metrics(&metrics);
    }

    if args.push.dry_run {
        if !ctx.quiet {
            println!();
            ui::info("Dry run, nothing pushed");
        }
        return Ok(());
    }

    let Some(gateway) = args.push.gateway.as_deref() else {
        bail!("No Pushgateway configured (set --gateway or PUSHGATEWAY_URL)");
    };
    let base_url = config::gateway_url(gateway)?;
    let client =
        PushClient::new(&base_url).with_retry(config::retry_config(args.push.retries));

    let batch = build_batch(&metrics, &args.push);

    let pb = (!ctx.quiet).then(|| {
        println!();
        ui::spinner(&format!("Pushing to {base_url}..."))
    });
    let result = publish(&client, &batch);
    if let Some(pb) = &pb {
        ui::finish_clear(pb);
    }
    result?;

    if !ctx.quiet {
        ui::success(&format!(
            "Pushed {} metrics to {} (job '{}')",
            batch.samples.len(),
            base_url,
            batch.job
        ));
    }
    Ok(())
}

/// Turn the metric set into a Pushgateway batch for this run.
fn build_batch(metrics: &MetricSet, push: &PushArgs) -> Batch {
    let mut batch = Batch::new(&push.job).with_grouping(config::grouping(push));
    batch.extend(
        metrics
            .gauges()
            .into_iter()
            .map(|g| Sample::gauge(g.name, g.help, g.value)),
    );
    batch
}

/// Attach the category advice to a collection failure.
fn collect_error(e: &runstats::Error) -> anyhow::Error {
    let category = e.category();
    anyhow::anyhow!("{e}\n  {}: {}", category.description(), category.advice())
}

fn publish(publisher: &dyn Publisher, batch: &Batch) -> Result<()> {
    publisher.publish(batch).map_err(|e| {
        let category = e.category();
        anyhow::anyhow!("{e}\n  {}: {}", category.description(), category.advice())
    })
}

fn print_metrics(metrics: &MetricSet) {
    ui::header("Terraform Run");
    ui::kv("Duration", &format!("{:.1}s", metrics.execution_duration_seconds));
    ui::kv("Timestamp", &metrics.timestamp.to_string());
    ui::flag("Drift detected", metrics.drift_detected, true);
    ui::flag("Succeeded", metrics.success, false);

    ui::header("Planned");
    ui::kv("Total", &metrics.planned.total.to_string());
    ui::kv("Add", &metrics.planned.added.to_string());
    ui::kv("Change", &metrics.planned.changed.to_string());
    ui::kv("Destroy", &metrics.planned.destroyed.to_string());
    ui::kv("Import", &metrics.planned.imported.to_string());

    if let Some(actual) = &metrics.actual {
        ui::header("Applied");
        ui::kv("Added", &actual.added.to_string());
        ui::kv("Changed", &actual.changed.to_string());
        ui::kv("Destroyed", &actual.destroyed.to_string());
        ui::kv("Imported", &actual.imported.to_string());
    } else {
        ui::dim("No apply log, applied counts not published");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushgateway::publisher::MockPublisher;
    use runstats::{ApplyStats, Tally};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const QUIET: Context = Context { quiet: true };

    fn collect_args(plan: &Path, start_time: Option<&str>) -> CollectArgs {
        CollectArgs {
            plan: plan.to_path_buf(),
            apply_log: None,
            refresh_log: None,
            start_time: start_time.map(str::to_string),
            strict_plan: false,
            push: PushArgs {
                gateway: None,
                dry_run: true,
                ..push_args()
            },
        }
    }

    fn metrics() -> MetricSet {
        MetricSet {
            execution_duration_seconds: 42.0,
            timestamp: 1_714_564_800,
            drift_detected: false,
            planned: Tally {
                total: 3,
                added: 2,
                changed: 1,
                destroyed: 0,
                imported: 0,
            },
            actual: Some(ApplyStats::new(2, 1, 0)),
            success: true,
        }
    }

    fn push_args() -> PushArgs {
        PushArgs {
            gateway: Some("pushgateway".to_string()),
            job: "terraform".to_string(),
            instance: Some("1234".to_string()),
            workflow: Some("deploy".to_string()),
            commit_message: None,
            retries: 1,
            dry_run: false,
        }
    }

    #[test]
    fn test_build_batch() {
        let batch = build_batch(&metrics(), &push_args());

        assert_eq!(batch.job, "terraform");
        assert_eq!(batch.samples.len(), 13);
        assert_eq!(
            batch.grouping.iter().collect::<Vec<_>>(),
            vec![("instance", "1234"), ("workflow_name", "deploy")]
        );

        let result = batch
            .samples
            .iter()
            .find(|s| s.name == "terraform_result")
            .unwrap();
        assert!((result.value - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_build_batch_without_apply() {
        let mut metrics = metrics();
        metrics.actual = None;

        let batch = build_batch(&metrics, &push_args());
        assert_eq!(batch.samples.len(), 9);
        assert!(!batch.samples.iter().any(|s| s.name == "terraform_added"));
    }

    #[test]
    fn test_publish_to_mock() {
        let mock = MockPublisher::new();
        let batch = build_batch(&metrics(), &push_args());

        publish(&mock, &batch).unwrap();
        assert_eq!(mock.published(), vec![batch]);
    }

    #[test]
    fn test_dry_run_with_invalid_start_time() {
        let dir = tempdir().unwrap();
        let plan = dir.path().join("plan.json");
        fs::write(&plan, r#"{"resource_changes": []}"#).unwrap();

        let args = collect_args(&plan, Some("2024-05-01 12:00:00"));
        assert!(run(&QUIET, args).is_ok());
    }

    #[test]
    fn test_strict_plan_error_carries_advice() {
        let dir = tempdir().unwrap();
        let plan = dir.path().join("plan.json");
        fs::write(&plan, "Terraform will perform the following actions:").unwrap();

        let mut args = collect_args(&plan, None);
        args.strict_plan = true;

        let err = run(&QUIET, args).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("malformed plan document"));
        assert!(message.contains("terraform show -json"));
    }

    #[test]
    fn test_push_requires_gateway() {
        let dir = tempdir().unwrap();
        let plan = dir.path().join("plan.json");
        fs::write(&plan, "{}").unwrap();

        let mut args = collect_args(&plan, None);
        args.push.dry_run = false;
        assert!(run(&QUIET, args).is_err());
    }

    #[test]
    fn test_publish_failure_carries_advice() {
        let mock = MockPublisher::new();
        mock.fail_with("connection refused", None);

        let err = publish(&mock, &build_batch(&metrics(), &push_args())).unwrap_err();
        assert!(err.to_string().contains("connection refused"));
        assert!(err.to_string().contains("PUSHGATEWAY_URL"));
    }
}
