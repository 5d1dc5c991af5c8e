//! The `frqtutor init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("frqtutor.toml").exists() {
        println!("frqtutor.toml already exists, skipping.");
    } else {
        std::fs::write("frqtutor.toml", SAMPLE_CONFIG)?;
        println!("Created frqtutor.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit frqtutor.toml with your API key (or set FRQTUTOR_OPENAI_KEY)");
    println!("  2. Run: frqtutor generate --topic \"Dinosaur extinction\" \\");
    println!("       --standard \"Cite textual evidence to support analysis\"");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# frqtutor configuration

default_provider = "openai"
default_model = "gpt-4.1"
default_temperature = 0.7
max_tokens = 1024

# Run yes/no quality audits on generated questions and feedback.
enable_qa = false
max_question_retries = 2
max_feedback_edits = 2

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"
"#;
