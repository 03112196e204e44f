//! Thought generator: one LLM call to produce up to `branches` candidate
//! next-thoughts for a path.
//!
//! Builds the proposal prompt from the `tot.propose_*` templates, invokes
//! the LLM, and parses the response through the tiered proposal parser. A
//! failed call or unparseable output degrades to an empty list: "no
//! expansion" for that node, never an error for the search.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::llm::LlmClient;
use crate::message::Message;
use crate::prompts::{fill, TotPrompts};
use crate::tot::parse::{parse_proposals, ParseOutcome};

/// Sentinel path rendering when the path is just the root problem.
const ROOT_PATH: &str = "(root)";

/// Generates candidate next-thoughts for a frontier node.
#[derive(Clone)]
pub struct ThoughtGenerator {
    llm: Arc<dyn LlmClient>,
    prompts: TotPrompts,
}

impl ThoughtGenerator {
    /// Creates a generator over the given LLM and prompt fragments.
    pub fn new(llm: Arc<dyn LlmClient>, prompts: TotPrompts) -> Self {
        Self { llm, prompts }
    }

    /// Renders a path for the prompt: `" -> "`-joined, or `"(root)"` when
    /// the path is just the problem.
    pub(crate) fn render_path(path: &[String]) -> String {
        if path.len() <= 1 {
            ROOT_PATH.to_string()
        } else {
            path.join(" -> ")
        }
    }

    /// Builds the two-message proposal prompt.
    fn build_messages(
        &self,
        problem: &str,
        context: &str,
        path: &[String],
        branches: usize,
    ) -> Vec<Message> {
        let branches_text = branches.to_string();
        let system = fill(&self.prompts.propose_system, &[("branches", branches_text.as_str())]);
        let user = fill(
            &self.prompts.propose_user,
            &[
                ("problem", problem),
                ("context", context),
                ("path", &Self::render_path(path)),
                ("branches", branches_text.as_str()),
            ],
        );
        vec![Message::system(system), Message::user(user)]
    }

    /// Proposes up to `branches` candidate next-thoughts for the path.
    ///
    /// Never errors: oracle failure or unparseable output yields an empty
    /// vector, which the search treats as "no expansion" for this node.
    pub async fn propose(
        &self,
        problem: &str,
        context: &str,
        path: &[String],
        branches: usize,
    ) -> Vec<String> {
        let messages = self.build_messages(problem, context, path, branches);
        let raw = match self.llm.invoke(&messages).await {
            Ok(response) => response.content,
            Err(e) => {
                warn!(error = %e, "proposal call failed; expanding to nothing");
                return Vec::new();
            }
        };

        let outcome = parse_proposals(&raw, branches);
        debug!(tier = outcome.tier(), "parsed proposals");
        if let ParseOutcome::Fallback(_) = outcome {
            warn!("proposal response was not a JSON array; used line fallback");
        }
        outcome.unwrap_or(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::prompts::default_from_embedded;

    fn generator(llm: MockLlm) -> ThoughtGenerator {
        ThoughtGenerator::new(Arc::new(llm), default_from_embedded().tot)
    }

    /// **Scenario**: a root path renders as the sentinel; longer paths join with arrows.
    #[test]
    fn render_path_sentinel_and_join() {
        assert_eq!(ThoughtGenerator::render_path(&["2+2".into()]), "(root)");
        assert_eq!(
            ThoughtGenerator::render_path(&["2+2".into(), "add".into()]),
            "2+2 -> add"
        );
    }

    /// **Scenario**: prompt messages carry problem, context, rendered path,
    /// and the branch budget.
    #[test]
    fn build_messages_fills_placeholders() {
        let g = generator(MockLlm::with_reply(""));
        let messages = g.build_messages("2+2", "math homework", &["2+2".into()], 2);
        assert_eq!(messages.len(), 2);
        assert!(matches!(&messages[0], Message::System(s) if s.contains('2')));
        let user = messages[1].content();
        assert!(user.contains("2+2"));
        assert!(user.contains("math homework"));
        assert!(user.contains("(root)"));
    }

    /// **Scenario**: JSON-array response parses to its elements, capped at branches.
    #[tokio::test]
    async fn propose_parses_json_array() {
        let g = generator(MockLlm::with_reply(r#"["a", "b", "c"]"#));
        let out = g.propose("p", "", &["p".into()], 2).await;
        assert_eq!(out, vec!["a".to_string(), "b".to_string()]);
    }

    /// **Scenario**: markdown-list response uses the line fallback.
    #[tokio::test]
    async fn propose_line_fallback() {
        let g = generator(MockLlm::with_reply("- a\n- b\n"));
        let out = g.propose("p", "", &["p".into()], 3).await;
        assert_eq!(out, vec!["a".to_string(), "b".to_string()]);
    }

    /// **Scenario**: empty oracle output expands to nothing.
    #[tokio::test]
    async fn propose_empty_output_is_no_expansion() {
        let g = generator(MockLlm::with_reply(""));
        let out = g.propose("p", "", &["p".into()], 3).await;
        assert!(out.is_empty());
    }

    /// **Scenario**: a failed oracle call degrades to an empty list instead
    /// of propagating the error.
    #[tokio::test]
    async fn propose_absorbs_llm_failure() {
        let g = generator(MockLlm::scripted(Vec::<String>::new()).then_fail("transport down"));
        let out = g.propose("p", "", &["p".into()], 3).await;
        assert!(out.is_empty());
    }
}
