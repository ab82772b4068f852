//! LLM summaries of a Terraform run.
//!
//! Gathers the refresh, plan and apply logs written by the CI job for one
//! run id, asks Gemini for a short human-readable summary and writes it
//! next to the logs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Model used when none is given.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

const PROMPT_HEADER: &str =
    "Here are three (two if apply is not present) logs from a Terraform execution:\n---\n";

const PROMPT_INSTRUCTIONS: &str = "Generate a human-readable summary of:
1. What was changed (added, updated, deleted)?
2. Any errors or warnings?
3. Overall outcome (success, failed, partial)?
4. Highlight risky or unusual changes.
Keep it under 250 words.";

/// Stages in prompt order.
pub const STAGES: [&str; 3] = ["refresh", "plan", "apply"];

/// Errors from the summarization step.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("no Terraform logs found for run {run_id} in {}", dir.display())]
    NoLogs { run_id: String, dir: PathBuf },

    #[error("reading log file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("writing summary {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Gemini request failed: {0}")]
    Request(#[from] ureq::Error),

    #[error("no content returned from Gemini")]
    Empty,
}

// ============================================================================
// Logs and Prompt
// ============================================================================

/// Path of a stage log for a run.
pub fn log_path(dir: &Path, stage: &str, run_id: &str) -> PathBuf {
    dir.join(format!("terraform-{stage}-{run_id}.log"))
}

/// Path the summary is written to.
pub fn summary_path(dir: &Path, run_id: &str) -> PathBuf {
    dir.join(format!("terraform-gemini-summary-{run_id}.log"))
}

/// Logs found for one run, as `(stage, content)` pairs.
#[derive(Debug, Default)]
pub struct RunLogs {
    pub sections: Vec<(&'static str, String)>,
}

impl RunLogs {
    /// Read every stage log that exists. Missing logs are skipped.
    pub fn load(dir: &Path, run_id: &str) -> Result<Self, SummaryError> {
        let mut sections = Vec::new();

        for stage in STAGES {
            let path = log_path(dir, stage, run_id);
            match fs::read(&path) {
                Ok(bytes) => {
                    sections.push((stage, String::from_utf8_lossy(&bytes).into_owned()));
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::warn!("log file {} not found, skipping", path.display());
                }
                Err(source) => return Err(SummaryError::Read { path, source }),
            }
        }

        if sections.is_empty() {
            return Err(SummaryError::NoLogs {
                run_id: run_id.to_string(),
                dir: dir.to_path_buf(),
            });
        }
        Ok(Self { sections })
    }

    /// Build the summarization prompt.
    pub fn prompt(&self) -> String {
        let mut prompt = String::from(PROMPT_HEADER);
        for (stage, content) in &self.sections {
            prompt.push_str(&format!(
                "📄 {} Log:\n{}\n\n",
                stage.to_uppercase(),
                content
            ));
        }
        prompt.push_str(PROMPT_INSTRUCTIONS);
        prompt
    }
}

// ============================================================================
// Summarizer
// ============================================================================

/// A text-in, text-out summarization service.
pub trait Summarizer {
    fn summarize(&self, prompt: &str) -> Result<String, SummaryError>;
}

/// Gemini `generateContent` client.
pub struct GeminiClient {
    agent: ureq::Agent,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(120)))
            .build()
            .into();
        Self {
            agent,
            api_base: GEMINI_API_BASE.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }
}

impl Summarizer for GeminiClient {
    fn summarize(&self, prompt: &str) -> Result<String, SummaryError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        let response: GenerateResponse = self
            .agent
            .post(&self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .send_json(&request)?
            .body_mut()
            .read_json()?;

        let text = response.text();
        if text.trim().is_empty() {
            return Err(SummaryError::Empty);
        }
        Ok(text)
    }
}

/// Summarize a run's logs and write the result. Returns the output path.
pub fn summarize_run(
    summarizer: &dyn Summarizer,
    dir: &Path,
    run_id: &str,
) -> Result<PathBuf, SummaryError> {
    let logs = RunLogs::load(dir, run_id)?;
    let summary = summarizer.summarize(&logs.prompt())?;

    let path = summary_path(dir, run_id);
    fs::write(&path, summary).map_err(|source| SummaryError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

// ============================================================================
// Gemini API types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }
}
