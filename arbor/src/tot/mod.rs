//! Tree-of-Thought deliberation: bounded-depth, bounded-branching beam
//! search over natural-language thoughts.
//!
//! The engine asks the LLM to propose candidate next-thoughts for each path
//! in the frontier, asks it again to score each candidate 0–10, keeps the
//! best `branches` candidates per layer, and returns the best-scoring path
//! seen anywhere in the search.
//!
//! Module layout:
//! - [`parse`]: tolerant parsing of oracle output ([`ParseOutcome`]).
//! - [`propose`]: [`ThoughtGenerator`] — candidate generation.
//! - [`score`]: [`ThoughtScorer`] — candidate scoring.
//! - [`event`]: [`SearchEvent`] — streamed progress milestones.
//! - [`search`]: [`TotEngine`] — the beam-search loop, `run` / `run_stream`.

pub mod event;
pub mod parse;
pub mod propose;
pub mod score;
pub mod search;

pub use event::SearchEvent;
pub use parse::ParseOutcome;
pub use propose::ThoughtGenerator;
pub use score::ThoughtScorer;
pub use search::TotEngine;

/// An immutable node in the thought search tree.
///
/// `path` runs from the root problem statement to this node inclusive, so
/// its length is depth + 1. A child's path is the parent's path plus the
/// proposed text; nodes are never mutated after creation.
#[derive(Debug, Clone)]
pub struct Thought {
    /// Proposal text combined with its scoring rationale; this is what gets
    /// reported to the user when the path is chosen.
    pub content: String,
    /// Oracle-reported score (nominally 0–10, passed through unclamped).
    pub score: f64,
    /// Ordered thought strings from the root problem to this node.
    pub path: Vec<String>,
}

impl Thought {
    /// Creates the root thought for a problem: score 0, path = [problem].
    pub fn root(problem: impl Into<String>) -> Self {
        let problem = problem.into();
        Self {
            content: problem.clone(),
            score: 0.0,
            path: vec![problem],
        }
    }
}

/// Search configuration: branch width and depth limit.
///
/// Engine-level defaults; both are clamped to at least 1 at construction.
/// Per-call overrides on [`TotEngine::run`] are used as supplied.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Max candidates per node per layer and the frontier cap after truncation.
    pub branches: usize,
    /// Max expansion layers before the search terminates.
    pub depth: usize,
}

impl SearchConfig {
    /// Creates a config, clamping both values to at least 1.
    pub fn new(branches: usize, depth: usize) -> Self {
        Self {
            branches: branches.max(1),
            depth: depth.max(1),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            branches: 3,
            depth: 2,
        }
    }
}

/// Final result of one deliberation run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TotResult {
    /// Human-readable trace assembled from every progress event (for
    /// display/debugging, not for re-parsing).
    pub thinking_process: String,
    /// Score of the best thought found (0.0 when none was produced).
    pub best_score: f64,
    /// Content of the best thought, or a fixed explanatory message on failure.
    pub final_answer: String,
    /// Whether any valid thought was produced.
    pub success: bool,
}

/// Answer reported when no candidate was ever scored.
pub const NO_THOUGHT_MESSAGE: &str =
    "Unable to produce a valid line of thought; try providing more context.";
