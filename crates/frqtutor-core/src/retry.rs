//! Bounded retry around one-shot judgment calls.
//!
//! The evaluator asks the model to end verdicts with a single token
//! ("CORRECT", "YES", ...). Models occasionally disagree with themselves or
//! break the output format, so each judgment is re-asked a bounded number of
//! times.

use crate::traits::{CompletionProvider, CompletionRequest};

/// Last whitespace-separated token of the last line of `text`.
///
/// Judgment prompts instruct the model to finish with a final verdict token,
/// so this is where the verdict lives when the model follows the format.
pub fn final_token(text: &str) -> &str {
    text.trim_end()
        .lines()
        .last()
        .unwrap_or("")
        .split_whitespace()
        .last()
        .unwrap_or("")
}

/// Issue the same judgment up to `attempts` times, accepting the first reply
/// that satisfies `accept`.
///
/// The first accepted attempt wins outright; attempts are not aggregated
/// into a vote, so a single agreeable reply outweighs any number of earlier
/// refusals. This leniency is deliberate and callers rely on it.
///
/// Provider errors abort immediately — only the judgment is retried, never
/// the transport.
pub async fn any_attempt_accepts<F>(
    provider: &dyn CompletionProvider,
    request: &CompletionRequest,
    attempts: u32,
    accept: F,
) -> anyhow::Result<bool>
where
    F: Fn(&str) -> bool,
{
    for _ in 0..attempts {
        let completion = provider.complete(request).await?;
        if accept(&completion.text) {
            return Ok(true);
        }
    }
    Ok(false)
}
