//! # Arbor
//!
//! A conversational agent in Rust with two memory tiers and an optional
//! Tree-of-Thought deliberation step before answering.
//!
//! ## Design principles
//!
//! - **External oracles behind traits**: text generation is [`LlmClient`],
//!   embeddings are [`Embedder`]; this crate never reimplements either.
//! - **Injected collaborators**: the agent and the search engine take their
//!   LLM, store, and prompts at construction. No module-level state, and
//!   every deliberation run is stateless between calls.
//! - **Degrade, don't crash**: oracle failures inside a deliberation become
//!   safe defaults (empty expansion, zero score); the caller always gets a
//!   well-formed result or event stream.
//!
//! ## Main modules
//!
//! - [`llm`]: [`LlmClient`] trait, [`MockLlm`], [`ChatOpenAI`].
//! - [`tot`]: [`TotEngine`] — beam search over thoughts; [`Thought`],
//!   [`SearchEvent`], [`TotResult`]; parsing in [`tot::parse`].
//! - [`memory`]: [`ConversationBuffer`] (short-term) and [`MemoryStore`]
//!   (long-term vector retrieval: [`InMemoryVectorStore`],
//!   [`SqliteVecStore`]); [`Embedder`], [`OpenAIEmbedder`].
//! - [`agent`]: [`ChatAgent`] — the chat loop over both tiers, fact
//!   extraction, summarize/extract/translate chains.
//! - [`prompts`]: JSON prompt-template loading with embedded defaults.
//! - [`message`]: [`Message`] (System / User / Assistant).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use arbor::llm::MockLlm;
//! use arbor::prompts::default_from_embedded;
//! use arbor::tot::TotEngine;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let llm = Arc::new(MockLlm::scripted([
//!     r#"["add the numbers", "use a calculator"]"#,
//!     r#"{"score": 4.0, "reason": "manual"}"#,
//!     r#"{"score": 9.0, "reason": "reliable"}"#,
//! ]));
//! let engine = TotEngine::new(llm, default_from_embedded().tot);
//! let result = engine.run("2+2", "", Some(2), Some(1)).await;
//! assert!(result.success);
//! println!("{}", result.final_answer);
//! # }
//! ```

pub mod agent;
pub mod error;
pub mod llm;
pub mod memory;
pub mod message;
pub mod prompts;
pub mod tot;

pub use agent::{ChatAgent, MemoryStats};
pub use error::AgentError;
pub use llm::{ChatOpenAI, LlmClient, LlmResponse, LlmUsage, MessageChunk, MockLlm};
pub use memory::{
    ConversationBuffer, Embedder, InMemoryVectorStore, MemoryKind, MemoryRecord, MemoryStore,
    OpenAIEmbedder, RecalledMemory, SqliteVecStore, StoreError,
};
pub use message::Message;
pub use prompts::{Prompts, PromptsError};
pub use tot::{SearchConfig, SearchEvent, Thought, TotEngine, TotResult};
