//! Chat agent: the conversational loop over both memory tiers.
//!
//! Each turn retrieves relevant long-term memories, assembles system prompt
//! + memory context + buffered history + user message, invokes the LLM, and
//! writes the exchange (and any extracted facts) back to memory. Deep
//! deliberation delegates to the Tree-of-Thought engine over the same LLM.
//!
//! All collaborators are injected; there is no module-level state, and two
//! agent sessions share nothing unless they are handed the same store.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::agent::facts::extract_facts;
use crate::error::AgentError;
use crate::llm::{LlmClient, MessageChunk};
use crate::memory::{ConversationBuffer, MemoryKind, MemoryRecord, MemoryStore};
use crate::message::Message;
use crate::prompts::{fill, Prompts};
use crate::tot::{SearchConfig, SearchEvent, TotEngine, TotResult};

/// Reply used when the LLM call fails mid-conversation.
const DEGRADED_REPLY: &str = "Sorry, something went wrong while generating a reply.";

/// Category assigned to facts extracted from chat messages.
const EXTRACTED_CATEGORY: &str = "extracted";

/// Memory usage counters surfaced to the CLI.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MemoryStats {
    /// Records in the long-term store.
    pub long_term: usize,
    /// Turns in the short-term buffer.
    pub short_term: usize,
}

/// Conversational agent with tiered memory and ToT deliberation.
pub struct ChatAgent {
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn MemoryStore>,
    buffer: ConversationBuffer,
    prompts: Prompts,
    /// How many memories to retrieve per turn.
    retrieve_limit: usize,
}

impl ChatAgent {
    /// Creates an agent over the given LLM and long-term store.
    ///
    /// `window` is the short-term turn count; `retrieve_limit` the number of
    /// long-term memories recalled per turn.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        store: Arc<dyn MemoryStore>,
        prompts: Prompts,
        window: usize,
        retrieve_limit: usize,
    ) -> Self {
        Self {
            llm,
            store,
            buffer: ConversationBuffer::new(window),
            prompts,
            retrieve_limit,
        }
    }

    /// Renders the recalled-memory block injected as a second system message.
    async fn build_memory_context(&self, query: &str) -> String {
        let memories = match self.store.search(query, self.retrieve_limit, None).await {
            Ok(memories) => memories,
            Err(e) => {
                warn!(error = %e, "memory search failed; continuing without recall");
                return "(no relevant memories)".to_string();
            }
        };
        if memories.is_empty() {
            return "(no relevant memories)".to_string();
        }

        let mut context = String::from("Relevant memories:\n");
        for (i, memory) in memories.iter().enumerate() {
            let date = memory.record.created_at.format("%Y-%m-%d");
            let label = match memory.record.kind {
                MemoryKind::Fact => "fact",
                MemoryKind::Conversation => "conversation",
            };
            context.push_str(&format!(
                "{}. [{}] {}: {}\n",
                i + 1,
                date,
                label,
                memory.record.text
            ));
        }
        context
    }

    /// Assembles the full message list for one turn.
    async fn build_turn_messages(&self, user_message: &str) -> Vec<Message> {
        let memory_context = self.build_memory_context(user_message).await;
        let mut messages = vec![
            Message::system(self.prompts.chat.system_prompt.clone()),
            Message::system(memory_context),
        ];
        messages.extend(self.buffer.as_messages());
        messages.push(Message::user(user_message));
        messages
    }

    /// Writes the finished exchange back to both memory tiers.
    async fn remember_turn(&mut self, user_message: &str, response: &str) {
        self.buffer.push_turn(user_message, response);

        if let Err(e) = self
            .store
            .add(MemoryRecord::conversation(user_message, response))
            .await
        {
            warn!(error = %e, "failed to store conversation memory");
        }

        for fact in extract_facts(user_message) {
            debug!(fact = %fact, "extracted fact");
            if let Err(e) = self
                .store
                .add(MemoryRecord::fact(fact, EXTRACTED_CATEGORY))
                .await
            {
                warn!(error = %e, "failed to store fact");
            }
        }
    }

    /// Handles one user message and returns the reply.
    ///
    /// An LLM failure yields an apologetic reply rather than an error; the
    /// failed turn is not written to memory.
    pub async fn chat(&mut self, user_message: &str) -> String {
        let messages = self.build_turn_messages(user_message).await;

        let response = match self.llm.invoke(&messages).await {
            Ok(response) => response.content,
            Err(e) => {
                warn!(error = %e, "chat completion failed");
                return DEGRADED_REPLY.to_string();
            }
        };

        self.remember_turn(user_message, &response).await;
        response
    }

    /// Streaming variant of [`chat`](Self::chat): forwards chunks through
    /// `chunk_tx` as they arrive and returns the complete reply.
    pub async fn chat_stream(
        &mut self,
        user_message: &str,
        chunk_tx: mpsc::Sender<MessageChunk>,
    ) -> String {
        let messages = self.build_turn_messages(user_message).await;

        let response = match self.llm.invoke_stream(&messages, Some(chunk_tx)).await {
            Ok(response) => response.content,
            Err(e) => {
                warn!(error = %e, "chat completion failed");
                return DEGRADED_REPLY.to_string();
            }
        };

        self.remember_turn(user_message, &response).await;
        response
    }

    /// Builds the deliberation engine over this agent's LLM and prompts.
    fn engine(&self) -> TotEngine {
        TotEngine::with_config(
            self.llm.clone(),
            self.prompts.tot.clone(),
            SearchConfig::default(),
        )
    }

    /// Runs a Tree-of-Thought deliberation over the problem and returns the
    /// collected result. `branches`/`depth` override the engine defaults.
    pub async fn deliberate(
        &self,
        problem: &str,
        context: &str,
        branches: Option<usize>,
        depth: Option<usize>,
    ) -> TotResult {
        self.engine().run(problem, context, branches, depth).await
    }

    /// Streaming variant of [`deliberate`](Self::deliberate).
    pub fn deliberate_stream(
        &self,
        problem: &str,
        context: &str,
        branches: Option<usize>,
        depth: Option<usize>,
    ) -> ReceiverStream<SearchEvent> {
        self.engine().run_stream(problem, context, branches, depth)
    }

    /// One-shot template chain: system prompt + filled user template.
    async fn template_chain(
        &self,
        system_prompt: &str,
        user_message: String,
    ) -> Result<String, AgentError> {
        let messages = vec![Message::system(system_prompt), Message::user(user_message)];
        Ok(self.llm.invoke(&messages).await?.content)
    }

    /// Summarizes a text; `max_len` adds a length bound to the request.
    pub async fn summarize(
        &self,
        text: &str,
        max_len: Option<usize>,
    ) -> Result<String, AgentError> {
        let mut user_message = fill(&self.prompts.summarize.user_template, &[("text", text)]);
        if let Some(n) = max_len {
            user_message.push_str(&format!(
                "\n\nKeep the summary under {} characters.",
                n
            ));
        }
        self.template_chain(&self.prompts.summarize.system_prompt, user_message)
            .await
    }

    /// Extracts key information from a text.
    pub async fn extract_information(&self, text: &str) -> Result<String, AgentError> {
        let user_message = fill(&self.prompts.extract_info.user_template, &[("text", text)]);
        self.template_chain(&self.prompts.extract_info.system_prompt, user_message)
            .await
    }

    /// Translates a text into the target language.
    pub async fn translate(
        &self,
        text: &str,
        target_language: &str,
    ) -> Result<String, AgentError> {
        let user_message = fill(
            &self.prompts.translate.user_template,
            &[("text", text), ("target_language", target_language)],
        );
        self.template_chain(&self.prompts.translate.system_prompt, user_message)
            .await
    }

    /// Current memory usage across both tiers.
    pub async fn memory_stats(&self) -> MemoryStats {
        let long_term = self.store.count().await.unwrap_or(0);
        MemoryStats {
            long_term,
            short_term: self.buffer.len(),
        }
    }

    /// Drops the short-term buffer only.
    pub fn clear_short_term(&mut self) {
        self.buffer.clear();
    }

    /// Drops both memory tiers.
    pub async fn clear_all(&mut self) -> Result<(), crate::memory::StoreError> {
        self.buffer.clear();
        self.store.clear().await
    }

    /// Exports every long-term record for serialization by the caller.
    pub async fn export_memories(
        &self,
    ) -> Result<Vec<MemoryRecord>, crate::memory::StoreError> {
        self.store.export().await
    }
}
