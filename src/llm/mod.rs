//! LLM 客户端模块
//!
//! 文本生成与文本分析两个协作方共用的 Chat Completions 传输层。
//! 文档引擎消费完整补全（JSON 模式），不做 SSE 流式。

mod client;
mod json;
mod types;

pub use client::LlmClient;
pub use json::extract_json_block;
pub use types::{ChatMessage, ChatOptions, LlmError};
