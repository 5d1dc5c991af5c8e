//! The `frqtutor model-answer` command.

use std::path::PathBuf;

use anyhow::Result;

use super::{load_config, read_text_file, require_nonempty, start_session};

pub async fn execute(
    topic: String,
    standard: String,
    context_file: PathBuf,
    question_file: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<()> {
    require_nonempty(&topic, "topic")?;
    require_nonempty(&standard, "standard")?;
    let context = read_text_file(&context_file, "context-file")?;
    let question = read_text_file(&question_file, "question-file")?;

    let config = load_config(config_path.as_deref())?;
    let mut session = start_session(&config, &standard, &topic, false).await?;

    let answer = session
        .generate_model_answer(&format!("{context}\n\n{question}"))
        .await?;

    println!("# Model Answer\n");
    println!("{answer}");

    Ok(())
}
