//! Streamed progress events for a Tree-of-Thought search.
//!
//! One event per milestone; the terminal [`SearchEvent::End`] is emitted
//! exactly once per run, always last. The non-streaming entry point is
//! defined in terms of these events: it joins the `Display` rendering of
//! every non-terminal event into the `thinking_process` trace and reads the
//! result fields from `End`, so both entry points stay consistent.

use std::fmt;

/// Max characters of candidate text carried in a [`SearchEvent::CandidateScore`].
pub const PREVIEW_LEN: usize = 60;

/// Truncates text for event payloads on a char boundary.
pub(crate) fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_LEN {
        text.to_string()
    } else {
        let cut: String = text.chars().take(PREVIEW_LEN).collect();
        format!("{}…", cut)
    }
}

/// Progress event emitted while a search runs.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// Search is starting with the resolved configuration.
    SearchStart { branches: usize, depth: usize },
    /// A new expansion layer begins (0-based index).
    LayerStart { layer: usize },
    /// A frontier node is about to be expanded; `path` is its rendered path.
    NodePath { path: String },
    /// One candidate was scored; `text` is a truncated preview.
    CandidateScore { text: String, score: f64 },
    /// Layer finished: this many candidates were retained as the new frontier.
    FrontierRetained { count: usize },
    /// The winning path, summarized (emitted only when a best exists).
    BestSummary {
        score: f64,
        /// Numbered steps, root excluded.
        steps: Vec<String>,
        /// Content of the best thought.
        summary: String,
    },
    /// Terminal event; always emitted exactly once, always last.
    End {
        best_score: f64,
        final_answer: String,
        success: bool,
    },
}

impl SearchEvent {
    /// True for the terminal event.
    pub fn is_end(&self) -> bool {
        matches!(self, SearchEvent::End { .. })
    }
}

impl fmt::Display for SearchEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchEvent::SearchStart { branches, depth } => {
                write!(f, "Deliberating (branches={}, depth={})", branches, depth)
            }
            SearchEvent::LayerStart { layer } => write!(f, "Layer {}:", layer + 1),
            SearchEvent::NodePath { path } => write!(f, "Expanding path: {}", path),
            SearchEvent::CandidateScore { text, score } => {
                write!(f, "Candidate [{:.2}]: {}", score, text)
            }
            SearchEvent::FrontierRetained { count } => {
                write!(f, "Frontier retained: {} candidate(s)", count)
            }
            SearchEvent::BestSummary {
                score,
                steps,
                summary,
            } => {
                let steps_text = if steps.is_empty() {
                    "(none)".to_string()
                } else {
                    steps
                        .iter()
                        .enumerate()
                        .map(|(i, s)| format!("Step {}: {}", i + 1, s))
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                write!(
                    f,
                    "Deliberation complete.\nBest path score: {:.2}\nReasoning path:\n{}\nSummary: {}",
                    score, steps_text, summary
                )
            }
            SearchEvent::End {
                best_score,
                success,
                ..
            } => write!(f, "End (best_score={:.2}, success={})", best_score, success),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: short text passes through preview untouched; long text
    /// is truncated on a char boundary with an ellipsis.
    #[test]
    fn preview_truncates_long_text() {
        assert_eq!(preview("short"), "short");
        let long = "x".repeat(100);
        let p = preview(&long);
        assert!(p.chars().count() <= PREVIEW_LEN + 1);
        assert!(p.ends_with('…'));
        // Multi-byte input must not split a char.
        let cjk = "思".repeat(80);
        let p = preview(&cjk);
        assert!(p.ends_with('…'));
    }

    /// **Scenario**: only End reports is_end.
    #[test]
    fn is_end_only_for_terminal() {
        assert!(SearchEvent::End {
            best_score: 0.0,
            final_answer: String::new(),
            success: false,
        }
        .is_end());
        assert!(!SearchEvent::LayerStart { layer: 0 }.is_end());
    }

    /// **Scenario**: Display renderings carry the key figures.
    #[test]
    fn display_renders_key_fields() {
        let s = SearchEvent::SearchStart {
            branches: 2,
            depth: 3,
        }
        .to_string();
        assert!(s.contains("branches=2") && s.contains("depth=3"));

        let s = SearchEvent::CandidateScore {
            text: "use a calculator".into(),
            score: 9.0,
        }
        .to_string();
        assert!(s.contains("9.00") && s.contains("use a calculator"));

        let s = SearchEvent::BestSummary {
            score: 9.0,
            steps: vec!["use a calculator".into()],
            summary: "Thought: use a calculator".into(),
        }
        .to_string();
        assert!(s.contains("Step 1: use a calculator"));
        assert!(s.contains("Best path score: 9.00"));

        let s = SearchEvent::BestSummary {
            score: 1.0,
            steps: vec![],
            summary: "root only".into(),
        }
        .to_string();
        assert!(s.contains("(none)"));
    }
}
