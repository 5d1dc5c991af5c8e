//! The `frqtutor evaluate` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::{load_config, read_text_file, require_nonempty, start_session};

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    topic: String,
    standard: String,
    context_file: PathBuf,
    question_file: PathBuf,
    response_file: PathBuf,
    qa: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    require_nonempty(&topic, "topic")?;
    require_nonempty(&standard, "standard")?;
    let context = read_text_file(&context_file, "context-file")?;
    let question = read_text_file(&question_file, "question-file")?;
    let response = read_text_file(&response_file, "response-file")?;

    let config = load_config(config_path.as_deref())?;
    let mut session = start_session(&config, &standard, &topic, qa).await?;

    let feedback = session
        .evaluate_response(&context, &question, &response)
        .await?;

    println!("# Feedback\n");
    println!("{feedback}");

    let mut table = Table::new();
    table.set_header(vec!["Session", "Model", "Quality gates", "Response words"]);
    table.add_row(vec![
        Cell::new(session.id()),
        Cell::new(&config.default_model),
        Cell::new(if qa || config.enable_qa { "on" } else { "off" }),
        Cell::new(response.split_whitespace().count()),
    ]);
    eprintln!("\n{table}");

    Ok(())
}
