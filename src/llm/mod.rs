//! LLM integration module.
//!
//! Provides an OpenAI-compatible client for chat completions with tool
//! calling, and the prompts used for itinerary planning.

mod client;
mod prompts;

pub use client::{
    AssistantTurn, ChatBackend, FunctionCall, FunctionSpec, LlmClient, Message, Role,
    TokenUsage, ToolCall, ToolDefinition,
};
pub use prompts::Prompts;
