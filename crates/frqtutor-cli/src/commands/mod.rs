//! Subcommand implementations.

use std::path::Path;

use anyhow::{Context, Result};

use frqtutor_core::session::{Session, SessionOptions};
use frqtutor_providers::{create_provider, load_config_from, TutorConfig};

pub mod evaluate;
pub mod generate;
pub mod init;
pub mod model_answer;

/// Reject blank required fields before anything touches the provider.
pub fn require_nonempty(value: &str, name: &str) -> Result<()> {
    anyhow::ensure!(!value.trim().is_empty(), "--{name} must not be empty");
    Ok(())
}

pub fn read_text_file(path: &Path, name: &str) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read --{name} {}", path.display()))?;
    anyhow::ensure!(
        !text.trim().is_empty(),
        "--{name} {} is empty",
        path.display()
    );
    Ok(text.trim_end().to_string())
}

/// Start a session for `standard`/`topic` against the configured provider.
///
/// The `--qa` flag can only turn quality gates on; when absent the config
/// value applies.
pub async fn start_session(
    config: &TutorConfig,
    standard: &str,
    topic: &str,
    qa_flag: bool,
) -> Result<Session> {
    let provider_config = config
        .providers
        .get(&config.default_provider)
        .with_context(|| {
            format!(
                "provider '{}' not found in config; run `frqtutor init` to create one",
                config.default_provider
            )
        })?;
    let provider = create_provider(provider_config)?;

    let mut options = SessionOptions::new(standard)
        .with_topic(topic)
        .with_quality_gates(qa_flag || config.enable_qa)
        .with_settings(config.completion_settings());
    options.max_question_retries = config.max_question_retries;
    options.max_feedback_edits = config.max_feedback_edits;

    Session::start(provider, options).await
}

pub fn load_config(path: Option<&Path>) -> Result<TutorConfig> {
    load_config_from(path)
}
