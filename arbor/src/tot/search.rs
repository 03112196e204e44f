//! Tree-of-Thought search engine: the beam-search loop, streaming and
//! collected entry points.
//!
//! The search is strictly sequential: one oracle call in flight at a time,
//! with no overlap between proposal generation and scoring and none across
//! frontier nodes. The streaming variant connects the loop to the consumer
//! through a capacity-1 channel, so the producer is never more than one
//! event ahead of the consumer; a dropped receiver stops the producer at its
//! next send. No timeout is enforced here; that belongs to the LLM client.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use crate::llm::LlmClient;
use crate::prompts::TotPrompts;
use crate::tot::event::{preview, SearchEvent};
use crate::tot::propose::ThoughtGenerator;
use crate::tot::score::ThoughtScorer;
use crate::tot::{SearchConfig, Thought, TotResult, NO_THOUGHT_MESSAGE};

/// Tree-of-Thought search engine.
///
/// Stateless between calls: every run builds a fresh root and frontier, and
/// nothing outlives the invocation. Concurrent independent searches are
/// independent `run` calls; they share no state.
#[derive(Clone)]
pub struct TotEngine {
    generator: ThoughtGenerator,
    scorer: ThoughtScorer,
    config: SearchConfig,
}

impl TotEngine {
    /// Creates an engine over the given LLM with default configuration.
    pub fn new(llm: Arc<dyn LlmClient>, prompts: TotPrompts) -> Self {
        Self::with_config(llm, prompts, SearchConfig::default())
    }

    /// Creates an engine with explicit defaults (clamped to ≥ 1 by
    /// [`SearchConfig::new`] when built through it).
    pub fn with_config(llm: Arc<dyn LlmClient>, prompts: TotPrompts, config: SearchConfig) -> Self {
        Self {
            generator: ThoughtGenerator::new(llm.clone(), prompts.clone()),
            scorer: ThoughtScorer::new(llm, prompts),
            config,
        }
    }

    /// Runs the search and collects the result.
    ///
    /// Defined in terms of [`run_stream`](Self::run_stream): consumes the
    /// full event sequence, joins the rendering of every non-terminal event
    /// into `thinking_process`, and reads the result fields from the
    /// terminal event, so the two entry points cannot disagree.
    pub async fn run(
        &self,
        problem: &str,
        context: &str,
        branches: Option<usize>,
        depth: Option<usize>,
    ) -> TotResult {
        let mut stream = self.run_stream(problem, context, branches, depth).into_inner();

        let mut trace: Vec<String> = Vec::new();
        let mut result = TotResult {
            thinking_process: String::new(),
            best_score: 0.0,
            final_answer: NO_THOUGHT_MESSAGE.to_string(),
            success: false,
        };

        while let Some(event) = stream.recv().await {
            match event {
                SearchEvent::End {
                    best_score,
                    final_answer,
                    success,
                } => {
                    result.best_score = best_score;
                    result.final_answer = final_answer;
                    result.success = success;
                }
                other => trace.push(other.to_string()),
            }
        }

        result.thinking_process = trace.join("\n");
        result
    }

    /// Runs the search as a finite, non-restartable event stream.
    ///
    /// Yields one [`SearchEvent`] per milestone and ends with exactly one
    /// [`SearchEvent::End`] carrying the result fields, whether the search
    /// succeeded or produced no valid thought. Dropping the stream abandons
    /// the search: the producer stops at its next send, with no background
    /// work left behind.
    pub fn run_stream(
        &self,
        problem: &str,
        context: &str,
        branches: Option<usize>,
        depth: Option<usize>,
    ) -> ReceiverStream<SearchEvent> {
        let branches = branches.unwrap_or(self.config.branches);
        let depth = depth.unwrap_or(self.config.depth);
        let generator = self.generator.clone();
        let scorer = self.scorer.clone();
        let problem = problem.to_string();
        let context = context.to_string();

        // Capacity 1: the loop blocks on each send until the consumer pulls,
        // keeping production in lockstep with consumption.
        let (tx, rx) = mpsc::channel(1);

        tokio::spawn(async move {
            search_loop(generator, scorer, problem, context, branches, depth, tx).await;
        });

        ReceiverStream::new(rx)
    }
}

/// The sequential beam-search loop. Sends events through `tx`; returns early
/// (without the terminal event) only when the receiver is gone.
async fn search_loop(
    generator: ThoughtGenerator,
    scorer: ThoughtScorer,
    problem: String,
    context: String,
    branches: usize,
    depth: usize,
    tx: mpsc::Sender<SearchEvent>,
) {
    // Receiver dropped → abandon the search.
    macro_rules! emit {
        ($event:expr) => {
            if tx.send($event).await.is_err() {
                return;
            }
        };
    }

    emit!(SearchEvent::SearchStart { branches, depth });

    let mut frontier: Vec<Thought> = vec![Thought::root(problem.clone())];
    let mut best: Option<Thought> = None;

    for layer in 0..depth {
        emit!(SearchEvent::LayerStart { layer });

        let mut next_frontier: Vec<Thought> = Vec::new();
        for node in &frontier {
            emit!(SearchEvent::NodePath {
                path: ThoughtGenerator::render_path(&node.path),
            });

            let proposals = generator
                .propose(&problem, &context, &node.path, branches)
                .await;
            for proposal in proposals {
                let (score, reason) = scorer.score(&problem, &context, &proposal).await;

                let mut path = node.path.clone();
                path.push(proposal.clone());
                let candidate = Thought {
                    content: format!("Thought: {}\nReason: {}", proposal, reason),
                    score,
                    path,
                };

                emit!(SearchEvent::CandidateScore {
                    text: preview(&proposal),
                    score,
                });

                // "No best yet" is distinct from "best has score 0": the
                // first candidate becomes best even at score 0.
                let improves = best.as_ref().map_or(true, |b| score > b.score);
                if improves {
                    best = Some(candidate.clone());
                }
                next_frontier.push(candidate);
            }
        }

        // Stable sort, so ties keep insertion order; total_cmp keeps
        // non-finite scores ordered deterministically.
        next_frontier.sort_by(|a, b| b.score.total_cmp(&a.score));
        next_frontier.truncate(branches);
        emit!(SearchEvent::FrontierRetained {
            count: next_frontier.len(),
        });

        frontier = next_frontier;
        if frontier.is_empty() {
            debug!(layer, "frontier empty; stopping early");
            break;
        }
    }

    match best {
        None => {
            emit!(SearchEvent::End {
                best_score: 0.0,
                final_answer: NO_THOUGHT_MESSAGE.to_string(),
                success: false,
            });
        }
        Some(best) => {
            emit!(SearchEvent::BestSummary {
                score: best.score,
                steps: best.path[1..].to_vec(),
                summary: best.content.clone(),
            });
            emit!(SearchEvent::End {
                best_score: best.score,
                final_answer: best.content,
                success: true,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::prompts::default_from_embedded;
    use tokio_stream::StreamExt;

    fn engine(llm: MockLlm) -> TotEngine {
        TotEngine::new(Arc::new(llm), default_from_embedded().tot)
    }

    /// **Scenario**: generator returns nothing at the first layer; the
    /// search terminates with the fixed failure message, success=false.
    #[tokio::test]
    async fn run_with_no_proposals_reports_failure() {
        let result = engine(MockLlm::with_reply("")).run("p", "", None, None).await;
        assert!(!result.success);
        assert_eq!(result.best_score, 0.0);
        assert_eq!(result.final_answer, NO_THOUGHT_MESSAGE);
        assert!(result.thinking_process.contains("Layer 1"));
    }

    /// **Scenario**: the stream ends with exactly one End event even when
    /// nothing was produced.
    #[tokio::test]
    async fn run_stream_emits_exactly_one_terminal_event() {
        let events: Vec<SearchEvent> = engine(MockLlm::with_reply(""))
            .run_stream("p", "", Some(2), Some(2))
            .collect()
            .await;
        let end_count = events.iter().filter(|e| e.is_end()).count();
        assert_eq!(end_count, 1);
        assert!(events.last().unwrap().is_end());
    }

    /// **Scenario**: dropping the stream early abandons the search without
    /// panicking; only buffered work happens.
    #[tokio::test]
    async fn run_stream_dropped_receiver_stops_producer() {
        // One proposal round scripted: propose, then a score.
        let llm = MockLlm::scripted([r#"["a"]"#, r#"{"score": 1, "reason": "r"}"#]);
        let mut stream = engine(llm).run_stream("p", "", Some(1), Some(5));
        // Pull the first event, then drop.
        let first = stream.next().await.unwrap();
        assert_eq!(first, SearchEvent::SearchStart { branches: 1, depth: 5 });
        drop(stream);
        // Give the producer a chance to observe the closed channel.
        tokio::task::yield_now().await;
    }

    /// **Scenario**: a candidate scored 0 still becomes best when no best
    /// exists yet (success with score 0).
    #[tokio::test]
    async fn first_zero_score_candidate_still_wins() {
        let llm = MockLlm::scripted([
            r#"["only idea"]"#,
            r#"{"score": 0, "reason": "weak"}"#,
        ]);
        let result = engine(llm).run("p", "", Some(1), Some(1)).await;
        assert!(result.success);
        assert_eq!(result.best_score, 0.0);
        assert!(result.final_answer.contains("only idea"));
    }

    /// **Scenario**: per-call overrides take precedence over engine defaults.
    #[tokio::test]
    async fn per_call_overrides_apply() {
        let events: Vec<SearchEvent> = engine(MockLlm::with_reply(""))
            .run_stream("p", "", Some(7), Some(4))
            .collect()
            .await;
        assert_eq!(
            events[0],
            SearchEvent::SearchStart { branches: 7, depth: 4 }
        );
    }
}
