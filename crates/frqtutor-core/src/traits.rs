//! Core trait definition for LLM completion backends.
//!
//! Implemented by the `frqtutor-providers` crate. The whole pipeline speaks
//! to the model through this one operation; every persona call and every
//! judgment call ends up here.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for LLM backends that complete a text prompt.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Complete a prompt. Errors surface unchanged to the caller; quality
    /// loops never swallow them.
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<Completion>;
}

/// A single completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model identifier (e.g. "gpt-4.1").
    pub model: String,
    /// The full prompt text. Persona prompts carry their own role framing,
    /// so there is usually no separate system prompt.
    pub prompt: String,
    /// Optional system prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Response from a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// The raw response text.
    pub text: String,
    /// Model that actually produced the response.
    pub model: String,
    /// Token usage.
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting for one completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub estimated_cost_usd: f64,
}

/// Settings applied to every completion a session issues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionSettings {
    /// Model identifier.
    pub model: String,
    /// Maximum tokens per completion.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4.1".to_string(),
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

impl CompletionSettings {
    /// Build a request for `prompt` with these settings.
    pub fn request(&self, prompt: impl Into<String>) -> CompletionRequest {
        CompletionRequest {
            model: self.model.clone(),
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_build_requests() {
        let settings = CompletionSettings {
            model: "test-model".into(),
            max_tokens: 256,
            temperature: 0.2,
        };
        let request = settings.request("hello");
        assert_eq!(request.model, "test-model");
        assert_eq!(request.prompt, "hello");
        assert_eq!(request.max_tokens, 256);
        assert!(request.system_prompt.is_none());
    }

    #[test]
    fn default_settings() {
        let settings = CompletionSettings::default();
        assert_eq!(settings.model, "gpt-4.1");
        assert_eq!(settings.max_tokens, 1024);
    }
}
