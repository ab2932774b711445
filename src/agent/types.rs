//! Types for the agent-runtime contract.

use serde::{Deserialize, Serialize};

use crate::tools::ToolDefinition;

/// Events a session emits while a turn is in flight, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Incremental assistant output.
    MessageDelta(String),
    /// Complete assistant message; used only when no deltas arrived.
    Message(String),
    /// Turn completed.
    Idle,
    /// Runtime-reported turn error.
    Error(String),
}

/// System-instruction injection at session creation.
#[derive(Debug, Clone, Serialize)]
pub struct SystemMessageConfig {
    /// Always "append": added alongside, not replacing, any runtime default
    /// instructions.
    pub mode: String,
    pub content: String,
}

impl SystemMessageConfig {
    pub fn append(content: impl Into<String>) -> Self {
        SystemMessageConfig {
            mode: "append".to_string(),
            content: content.into(),
        }
    }
}

/// Configuration for creating a session with a caller-chosen id.
#[derive(Debug, Clone, Serialize)]
pub struct SessionConfig {
    pub session_id: String,
    pub model: String,
    pub streaming: bool,
    pub tools: Vec<ToolDefinition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_message: Option<SystemMessageConfig>,
}

/// Session metadata from the runtime's listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionInfo {
    pub id: String,
}
