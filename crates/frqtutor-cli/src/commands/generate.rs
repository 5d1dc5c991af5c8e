//! The `frqtutor generate` command.

use std::path::PathBuf;

use anyhow::Result;

use super::{load_config, require_nonempty, start_session};

pub async fn execute(
    topic: String,
    standard: String,
    qa: bool,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    require_nonempty(&topic, "topic")?;
    require_nonempty(&standard, "standard")?;

    let config = load_config(config_path.as_deref())?;
    let mut session = start_session(&config, &standard, &topic, qa).await?;

    let (context, question) = session.generate_question().await?;

    println!("# Free-Response Question\n");
    println!("## Context\n\n{context}\n");
    println!("## Question\n\n{question}\n");
    println!("## Rubric\n\n{}", session.rubric());

    if let Some(dir) = output {
        std::fs::create_dir_all(&dir)?;
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

        let context_path = dir.join(format!("context-{timestamp}.md"));
        std::fs::write(&context_path, &context)?;
        let question_path = dir.join(format!("question-{timestamp}.md"));
        std::fs::write(&question_path, &question)?;
        let rubric_path = dir.join(format!("rubric-{timestamp}.md"));
        std::fs::write(&rubric_path, session.rubric())?;

        eprintln!("\nSaved: {}", context_path.display());
        eprintln!("Saved: {}", question_path.display());
        eprintln!("Saved: {}", rubric_path.display());
    }

    Ok(())
}
