//! Thought scorer: one LLM call to rate a candidate thought 0–10 with a
//! rationale.
//!
//! Scoring never raises. A clean JSON object gives `(score, reason)`; free
//! text with a leading number gives that number with the whole text as the
//! rationale; anything else (including a failed oracle call) gives
//! `(0.0, raw)`.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::llm::LlmClient;
use crate::message::Message;
use crate::prompts::{fill, TotPrompts};
use crate::tot::parse::{parse_score, ParseOutcome};

/// Scores candidate thoughts against the problem and context.
#[derive(Clone)]
pub struct ThoughtScorer {
    llm: Arc<dyn LlmClient>,
    prompts: TotPrompts,
}

impl ThoughtScorer {
    /// Creates a scorer over the given LLM and prompt fragments.
    pub fn new(llm: Arc<dyn LlmClient>, prompts: TotPrompts) -> Self {
        Self { llm, prompts }
    }

    fn build_messages(&self, problem: &str, context: &str, thought: &str) -> Vec<Message> {
        let system = self.prompts.score_system.clone();
        let user = fill(
            &self.prompts.score_user,
            &[
                ("problem", problem),
                ("context", context),
                ("thought", thought),
            ],
        );
        vec![Message::system(system), Message::user(user)]
    }

    /// Scores one candidate thought. Always yields a value.
    ///
    /// The score is passed through as reported by the oracle; out-of-range
    /// values are not clamped.
    pub async fn score(&self, problem: &str, context: &str, thought: &str) -> (f64, String) {
        let messages = self.build_messages(problem, context, thought);
        let raw = match self.llm.invoke(&messages).await {
            Ok(response) => response.content,
            Err(e) => {
                warn!(error = %e, "scoring call failed; defaulting to 0");
                return (0.0, format!("scoring failed: {}", e));
            }
        };

        let outcome = parse_score(&raw);
        debug!(tier = outcome.tier(), "parsed score");
        match outcome {
            ParseOutcome::Parsed(v) | ParseOutcome::Fallback(v) => v,
            ParseOutcome::Unparseable => (0.0, raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::prompts::default_from_embedded;

    fn scorer(llm: MockLlm) -> ThoughtScorer {
        ThoughtScorer::new(Arc::new(llm), default_from_embedded().tot)
    }

    /// **Scenario**: clean JSON gives (score, reason).
    #[tokio::test]
    async fn score_parses_json_object() {
        let s = scorer(MockLlm::with_reply(r#"{"score": 7.5, "reason": "good"}"#));
        let (score, reason) = s.score("p", "", "thought").await;
        assert_eq!(score, 7.5);
        assert_eq!(reason, "good");
    }

    /// **Scenario**: free text with a leading number keeps the full text as
    /// the rationale.
    #[tokio::test]
    async fn score_token_fallback() {
        let s = scorer(MockLlm::with_reply("7.5 because it's solid"));
        let (score, reason) = s.score("p", "", "thought").await;
        assert_eq!(score, 7.5);
        assert_eq!(reason, "7.5 because it's solid");
    }

    /// **Scenario**: garbage yields 0.0 with the raw text verbatim.
    #[tokio::test]
    async fn score_garbage_defaults_to_zero() {
        let s = scorer(MockLlm::with_reply("garbage!!"));
        let (score, reason) = s.score("p", "", "thought").await;
        assert_eq!(score, 0.0);
        assert_eq!(reason, "garbage!!");
    }

    /// **Scenario**: out-of-range scores pass through unclamped.
    #[tokio::test]
    async fn score_out_of_range_passes_through() {
        let s = scorer(MockLlm::with_reply(r#"{"score": 42, "reason": "over"}"#));
        let (score, _) = s.score("p", "", "thought").await;
        assert_eq!(score, 42.0);

        let s = scorer(MockLlm::with_reply(r#"{"score": -3, "reason": "under"}"#));
        let (score, _) = s.score("p", "", "thought").await;
        assert_eq!(score, -3.0);
    }

    /// **Scenario**: a failed oracle call degrades to (0.0, message) instead
    /// of propagating the error.
    #[tokio::test]
    async fn score_absorbs_llm_failure() {
        let s = scorer(MockLlm::scripted(Vec::<String>::new()).then_fail("transport down"));
        let (score, reason) = s.score("p", "", "thought").await;
        assert_eq!(score, 0.0);
        assert!(reason.contains("transport down"));
    }

    /// **Scenario**: the scoring prompt carries problem, context, and thought.
    #[test]
    fn build_messages_fills_placeholders() {
        let s = scorer(MockLlm::with_reply(""));
        let messages = s.build_messages("2+2", "math", "use a calculator");
        assert_eq!(messages.len(), 2);
        let user = messages[1].content();
        assert!(user.contains("2+2"));
        assert!(user.contains("math"));
        assert!(user.contains("use a calculator"));
    }
}
