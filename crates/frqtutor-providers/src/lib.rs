//! frqtutor-providers — LLM completion backends.
//!
//! Implements the `CompletionProvider` trait for the OpenAI API (the
//! backend the tutor was built against) plus a scripted mock for tests, and
//! handles provider configuration loading.

pub mod config;
pub mod mock;
pub mod openai;

pub use config::{create_provider, load_config, load_config_from, ProviderConfig, TutorConfig};
pub use frqtutor_core::error::ProviderError;
pub use mock::MockProvider;
pub use openai::OpenAiProvider;
