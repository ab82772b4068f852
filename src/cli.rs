use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tfmetrics")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Publish Terraform run metrics to a Prometheus Pushgateway", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Derive metrics from plan/apply/refresh artifacts and push them
    Collect(CollectArgs),

    /// Summarize a run's logs with Gemini
    Summarize(SummarizeArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Collect
// ============================================================================

#[derive(Args)]
pub struct CollectArgs {
    /// Plan JSON from `terraform show -json`
    #[arg(long, env = "TERRAFORM_PLAN_PATH")]
    pub plan: PathBuf,

    /// Apply log (enables the terraform_added/changed/... gauges)
    #[arg(long, env = "TERRAFORM_APPLY_LOG_PATH")]
    pub apply_log: Option<PathBuf>,

    /// Refresh log used for drift detection
    #[arg(long, env = "TERRAFORM_REFRESH_LOG_PATH")]
    pub refresh_log: Option<PathBuf>,

    /// Run start time (Unix seconds or RFC3339); defaults to now
    #[arg(long, env = "TERRAFORM_START_TIME")]
    pub start_time: Option<String>,

    /// Fail instead of publishing zero counts when the plan cannot be decoded
    #[arg(long)]
    pub strict_plan: bool,

    #[command(flatten)]
    pub push: PushArgs,
}

#[derive(Args)]
pub struct PushArgs {
    /// Pushgateway host or URL (a bare host gets http:// and port 9091)
    #[arg(long, env = "PUSHGATEWAY_URL")]
    pub gateway: Option<String>,

    /// Job name for the grouping key
    #[arg(long, env = "PUSHGATEWAY_JOB", default_value = "terraform")]
    pub job: String,

    /// Instance label (CI run id)
    #[arg(long, env = "GITHUB_RUN_ID")]
    pub instance: Option<String>,

    /// Workflow name label
    #[arg(long, env = "GITHUB_WORKFLOW")]
    pub workflow: Option<String>,

    /// Commit message label
    #[arg(long, env = "COMMIT_MESSAGE")]
    pub commit_message: Option<String>,

    /// Attempts for transient push failures
    #[arg(long, default_value = "3")]
    pub retries: u32,

    /// Print the gauges without pushing
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

// ============================================================================
// Summarize
// ============================================================================

#[derive(Args)]
pub struct SummarizeArgs {
    /// CI run id used in the log file names
    #[arg(long, env = "GITHUB_RUN_ID")]
    pub run_id: String,

    /// Directory holding terraform-{refresh,plan,apply}-<run-id>.log
    #[arg(long, default_value = "exporter")]
    pub log_dir: PathBuf,

    /// Gemini model
    #[arg(long, default_value = crate::summary::DEFAULT_MODEL)]
    pub model: String,

    /// Gemini API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}
