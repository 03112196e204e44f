//! Mock LLM for tests and examples.
//!
//! Two modes: a fixed reply returned on every call, or a scripted queue of
//! replies consumed in order (the deterministic oracle stub the search-engine
//! tests run against). A reply slot can also be a failure, to exercise the
//! degrade-to-default paths of the Tree-of-Thought adapters.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;

/// One scripted reply: either assistant text or a transport failure.
enum Scripted {
    Reply(String),
    Fail(String),
}

/// Mock LLM: fixed or scripted assistant text.
///
/// `with_reply` returns the same content on every call. `scripted` pops one
/// queued entry per call; when the queue runs dry it falls back to the fixed
/// content (empty string unless set), so a search that makes more calls than
/// scripted simply sees empty oracle output.
pub struct MockLlm {
    /// Content returned when no scripted entry is queued.
    content: String,
    /// Queued replies consumed front-to-back, one per invoke().
    script: Mutex<VecDeque<Scripted>>,
}

impl MockLlm {
    /// Creates a mock that returns the same assistant text on every call.
    pub fn with_reply(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            script: Mutex::new(VecDeque::new()),
        }
    }

    /// Creates a mock that replays `replies` in order, then returns empty text.
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            content: String::new(),
            script: Mutex::new(replies.into_iter().map(|r| Scripted::Reply(r.into())).collect()),
        }
    }

    /// Queues a failure slot: the corresponding invoke() returns Err.
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Fail(message.into()));
        self
    }

    /// Queues one more scripted reply (builder).
    pub fn then_reply(self, content: impl Into<String>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Reply(content.into()));
        self
    }

    /// Number of scripted entries not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, _messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Reply(content)) => Ok(LlmResponse {
                content,
                usage: None,
            }),
            Some(Scripted::Fail(message)) => Err(AgentError::ExecutionFailed(message)),
            None => Ok(LlmResponse {
                content: self.content.clone(),
                usage: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_reply_returns_same_content_every_call() {
        let llm = MockLlm::with_reply("ok");
        for _ in 0..3 {
            let resp = llm.invoke(&[]).await.unwrap();
            assert_eq!(resp.content, "ok");
        }
    }

    #[tokio::test]
    async fn scripted_replays_in_order_then_empty() {
        let llm = MockLlm::scripted(["first", "second"]);
        assert_eq!(llm.invoke(&[]).await.unwrap().content, "first");
        assert_eq!(llm.invoke(&[]).await.unwrap().content, "second");
        assert_eq!(llm.invoke(&[]).await.unwrap().content, "");
        assert_eq!(llm.remaining(), 0);
    }

    #[tokio::test]
    async fn then_fail_and_then_reply_slots_in_order() {
        let llm = MockLlm::scripted(["ok"])
            .then_fail("boom")
            .then_reply("recovered");
        assert_eq!(llm.invoke(&[]).await.unwrap().content, "ok");
        let err = llm.invoke(&[]).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
        assert_eq!(llm.invoke(&[]).await.unwrap().content, "recovered");
    }
}
