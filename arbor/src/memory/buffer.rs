//! Short-term conversation buffer: the windowed turn memory.
//!
//! Keeps the last `window` user/assistant exchanges and replays them as
//! messages when building the next completion request. Purely in-process;
//! lifetime is the agent session.

use std::collections::VecDeque;

use crate::message::Message;

/// One user/assistant exchange.
#[derive(Debug, Clone)]
pub struct Turn {
    pub user: String,
    pub assistant: String,
}

/// Bounded window of recent turns.
#[derive(Debug)]
pub struct ConversationBuffer {
    turns: VecDeque<Turn>,
    window: usize,
}

impl ConversationBuffer {
    /// Creates a buffer keeping at most `window` turns (clamped to ≥ 1).
    pub fn new(window: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            window: window.max(1),
        }
    }

    /// Records one exchange, evicting the oldest turn beyond the window.
    pub fn push_turn(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.turns.push_back(Turn {
            user: user.into(),
            assistant: assistant.into(),
        });
        while self.turns.len() > self.window {
            self.turns.pop_front();
        }
    }

    /// Replays the window as alternating User/Assistant messages, oldest first.
    pub fn as_messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.turns.len() * 2);
        for turn in &self.turns {
            messages.push(Message::user(turn.user.clone()));
            messages.push(Message::assistant(turn.assistant.clone()));
        }
        messages
    }

    /// Number of buffered turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True when no turns are buffered.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Drops all buffered turns.
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
