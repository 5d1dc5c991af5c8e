//! Scripted completion provider for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::traits::{Completion, CompletionProvider, CompletionRequest, TokenUsage};

struct Rule {
    matches: String,
    replies: VecDeque<String>,
}

/// A provider that answers by prompt-substring matching, with per-rule reply
/// sequences.
///
/// Because persona prompts carry the full transcript, a rule keyed on an old
/// task would match every later prompt too. To disambiguate, the rule whose
/// substring occurs *last* in the prompt wins — that is always the current
/// task, since tasks are appended at the end of the rendered prompt.
///
/// A rule's replies are consumed in order; the final reply repeats once the
/// sequence is exhausted.
pub struct ScriptedProvider {
    rules: Mutex<Vec<Rule>>,
    default_reply: String,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::with_default("OK")
    }

    pub fn with_default(reply: &str) -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            default_reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Add a rule: prompts containing `substring` get `replies` in order.
    pub fn on(self, substring: &str, replies: &[&str]) -> Self {
        self.rules.lock().unwrap().push(Rule {
            matches: substring.to_string(),
            replies: replies.iter().map(|r| r.to_string()).collect(),
        });
        self
    }

    /// All prompts received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// How many received prompts contain `substring`.
    pub fn calls_containing(&self, substring: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|prompt| prompt.contains(substring))
            .count()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<Completion> {
        self.calls.lock().unwrap().push(request.prompt.clone());

        let mut rules = self.rules.lock().unwrap();
        let matched = rules
            .iter_mut()
            .filter_map(|rule| request.prompt.rfind(&rule.matches).map(|pos| (pos, rule)))
            .max_by_key(|(pos, _)| *pos)
            .map(|(_, rule)| rule);

        let text = match matched {
            Some(rule) => {
                if rule.replies.len() > 1 {
                    rule.replies.pop_front().unwrap()
                } else {
                    rule.replies
                        .front()
                        .cloned()
                        .unwrap_or_else(|| self.default_reply.clone())
                }
            }
            None => self.default_reply.clone(),
        };

        Ok(Completion {
            text,
            model: request.model.clone(),
            token_usage: TokenUsage::default(),
            latency_ms: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::CompletionSettings;

    #[tokio::test]
    async fn latest_match_wins_over_history() {
        let provider = ScriptedProvider::new()
            .on("alpha", &["A"])
            .on("beta", &["B"]);
        let settings = CompletionSettings::default();

        // "alpha" appears earlier in the prompt, "beta" is the current task.
        let completion = provider
            .complete(&settings.request("history: alpha\ncurrent: beta"))
            .await
            .unwrap();
        assert_eq!(completion.text, "B");
    }

    #[tokio::test]
    async fn sequences_consume_then_repeat_last() {
        let provider = ScriptedProvider::new().on("judge", &["NO", "NO", "YES"]);
        let settings = CompletionSettings::default();

        let mut answers = Vec::new();
        for _ in 0..5 {
            answers.push(provider.complete(&settings.request("judge")).await.unwrap().text);
        }
        assert_eq!(answers, ["NO", "NO", "YES", "YES", "YES"]);
    }
}
