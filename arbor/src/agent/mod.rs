//! Agent layer: the conversational loop and its fact extraction.
//!
//! [`ChatAgent`] glues the LLM client, both memory tiers, and the prompt
//! templates into a chat loop, and fronts the Tree-of-Thought engine for
//! deep deliberation. [`facts`] holds the regex rules that turn personal
//! details in user messages into storable facts.

pub mod chat;
pub mod facts;

pub use chat::{ChatAgent, MemoryStats};
pub use facts::extract_facts;
