//! Mock provider for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use frqtutor_core::traits::{Completion, CompletionProvider, CompletionRequest, TokenUsage};

struct Rule {
    matches: String,
    replies: Vec<String>,
    next: usize,
}

/// A mock completion provider for exercising the tutoring pipeline without
/// real API calls.
///
/// Rules map a prompt substring to a sequence of replies; the sequence
/// advances one reply per matching call and sticks on its last entry. When
/// several rules match, the one whose substring occurs furthest into the
/// prompt wins, so a rule keyed on the current task beats one keyed on an
/// earlier exchange replayed in the persona's chat history.
pub struct MockProvider {
    rules: Mutex<Vec<Rule>>,
    default_reply: String,
    call_count: AtomicU32,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockProvider {
    /// Create a mock with no rules that always returns `reply`.
    pub fn with_fixed_reply(reply: &str) -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            default_reply: reply.to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Add a rule: prompts containing `matches` get `replies` in order,
    /// repeating the last reply once the sequence is spent.
    pub fn on(self, matches: &str, replies: &[&str]) -> Self {
        self.rules.lock().unwrap().push(Rule {
            matches: matches.to_string(),
            replies: replies.iter().map(|r| r.to_string()).collect(),
            next: 0,
        });
        self
    }

    /// Number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The last request this provider received.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request.lock().unwrap().clone()
    }

    fn reply_for(&self, prompt: &str) -> String {
        let mut rules = self.rules.lock().unwrap();
        let best = rules
            .iter_mut()
            .filter_map(|rule| prompt.rfind(&rule.matches).map(|pos| (pos, rule)))
            .max_by_key(|(pos, _)| *pos);

        match best {
            Some((_, rule)) => {
                let reply = rule.replies[rule.next.min(rule.replies.len() - 1)].clone();
                if rule.next + 1 < rule.replies.len() {
                    rule.next += 1;
                }
                reply
            }
            None => self.default_reply.clone(),
        }
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<Completion> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        let text = self.reply_for(&request.prompt);
        let completion_tokens = (text.len() / 4) as u32; // rough estimate
        let prompt_tokens = (request.prompt.len() / 4) as u32;

        Ok(Completion {
            text,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
                estimated_cost_usd: 0.0,
            },
            latency_ms: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> CompletionRequest {
        CompletionRequest {
            model: "mock".into(),
            prompt: prompt.into(),
            system_prompt: None,
            max_tokens: 100,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn fixed_reply() {
        let provider = MockProvider::with_fixed_reply("always this");
        let response = provider.complete(&request("anything")).await.unwrap();
        assert_eq!(response.text, "always this");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.last_request().unwrap().prompt, "anything");
    }

    #[tokio::test]
    async fn substring_matching() {
        let provider = MockProvider::with_fixed_reply("default")
            .on("introduction", &["An opening line."])
            .on("question", &["Why did the empire fall?"]);

        let resp = provider
            .complete(&request("Write an introduction"))
            .await
            .unwrap();
        assert_eq!(resp.text, "An opening line.");

        let resp = provider
            .complete(&request("Generate a question"))
            .await
            .unwrap();
        assert_eq!(resp.text, "Why did the empire fall?");

        let resp = provider.complete(&request("unmatched")).await.unwrap();
        assert_eq!(resp.text, "default");
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn reply_sequences_advance_then_stick() {
        let provider =
            MockProvider::with_fixed_reply("default").on("audit", &["NO", "YES"]);

        assert_eq!(provider.complete(&request("audit")).await.unwrap().text, "NO");
        assert_eq!(provider.complete(&request("audit")).await.unwrap().text, "YES");
        assert_eq!(provider.complete(&request("audit")).await.unwrap().text, "YES");
    }

    #[tokio::test]
    async fn rightmost_match_wins() {
        let provider = MockProvider::with_fixed_reply("default")
            .on("introduction", &["intro reply"])
            .on("question", &["question reply"]);

        // A persona prompt replays earlier tasks in its history; the rule
        // matching the trailing task must win.
        let prompt = "Human: Write an introduction\nMary: done\nHuman: Generate a question";
        let resp = provider.complete(&request(prompt)).await.unwrap();
        assert_eq!(resp.text, "question reply");
    }
}
