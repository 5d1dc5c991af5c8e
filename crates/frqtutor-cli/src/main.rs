//! frqtutor CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use frqtutor_core::error::ProviderError;

mod commands;

#[derive(Parser)]
#[command(name = "frqtutor", version, about = "LLM-backed free-response-question tutor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a free-response question for a topic
    Generate {
        /// Learning topic (e.g. "Dinosaur extinction")
        #[arg(long)]
        topic: String,

        /// Core learning standard the question targets
        #[arg(long)]
        standard: String,

        /// Run the quality gate on the generated question
        #[arg(long)]
        qa: bool,

        /// Directory to save timestamped question artifacts
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Simulate a model answer to a generated question
    ModelAnswer {
        /// Learning topic
        #[arg(long)]
        topic: String,

        /// Core learning standard
        #[arg(long)]
        standard: String,

        /// File holding the question context
        #[arg(long)]
        context_file: PathBuf,

        /// File holding the question
        #[arg(long)]
        question_file: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Evaluate a student response and print feedback
    Evaluate {
        /// Learning topic
        #[arg(long)]
        topic: String,

        /// Core learning standard
        #[arg(long)]
        standard: String,

        /// File holding the question context
        #[arg(long)]
        context_file: PathBuf,

        /// File holding the question
        #[arg(long)]
        question_file: PathBuf,

        /// File holding the student response
        #[arg(long)]
        response_file: PathBuf,

        /// Run the quality gate on the assembled feedback
        #[arg(long)]
        qa: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("frqtutor=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            topic,
            standard,
            qa,
            output,
            config,
        } => commands::generate::execute(topic, standard, qa, output, config).await,
        Commands::ModelAnswer {
            topic,
            standard,
            context_file,
            question_file,
            config,
        } => {
            commands::model_answer::execute(topic, standard, context_file, question_file, config)
                .await
        }
        Commands::Evaluate {
            topic,
            standard,
            context_file,
            question_file,
            response_file,
            qa,
            config,
        } => {
            commands::evaluate::execute(
                topic,
                standard,
                context_file,
                question_file,
                response_file,
                qa,
                config,
            )
            .await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        if let Some(ProviderError::AuthenticationFailed(_)) = e.downcast_ref::<ProviderError>() {
            eprintln!(
                "Hint: check the api_key in frqtutor.toml or set FRQTUTOR_OPENAI_KEY."
            );
        }
        process::exit(1);
    }
}
