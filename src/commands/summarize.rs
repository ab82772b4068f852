use anyhow::{Context as _, Result};

use crate::Context;
use crate::cli::SummarizeArgs;
use crate::summary::{self, GeminiClient};
use crate::ui;

pub fn run(ctx: &Context, args: SummarizeArgs) -> Result<()> {
    let api_key = args
        .api_key
        .filter(|key| !key.trim().is_empty())
        .context("No Gemini API key (set --api-key or GOOGLE_API_KEY)")?;

    let client = GeminiClient::new(api_key, &args.model);

    let pb = (!ctx.quiet)
        .then(|| ui::spinner(&format!("Summarizing run {} with {}...", args.run_id, args.model)));
    let result = summary::summarize_run(&client, &args.log_dir, &args.run_id);
    if let Some(pb) = &pb {
        ui::finish_clear(pb);
    }

    let path = result.with_context(|| format!("Failed to summarize run {}", args.run_id))?;

    if !ctx.quiet {
        ui::success(&format!("Summary written to {}", path.display()));
    }
    Ok(())
}
