//! The seam between this program and the external agent runtime.
//!
//! Streaming is producer/consumer: the transport task produces ordered
//! `SessionEvent`s into an unbounded channel and must never block on the
//! consumer; the caller drains the receiver while awaiting turn completion.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

use super::types::{SessionConfig, SessionEvent, SessionInfo};
use crate::error::AgentError;
use crate::tools::ToolDefinition;

/// A live conversational session, existing or newly created.
#[async_trait]
pub trait AgentSession: Send {
    /// Take the event receiver for this session. Yields `None` once taken;
    /// exactly one consumer drains the stream.
    fn take_events(&mut self) -> Option<UnboundedReceiver<SessionEvent>>;

    /// Send one turn and block until the runtime reports completion or the
    /// timeout elapses. Tool invocations requested by the runtime are
    /// dispatched internally before completion is reported.
    async fn send_and_wait(&mut self, prompt: &str, timeout: Duration) -> Result<(), AgentError>;

    /// Release the local session handle. Idempotent; does not delete the
    /// durable session on the runtime, so the same id can be resumed later.
    async fn destroy(&mut self) -> Result<(), AgentError>;
}

/// The external conversational-agent runtime.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Resume an existing session by id. Any failure is treated by callers
    /// as "no such session".
    async fn resume_session(
        &self,
        session_id: &str,
        tools: Vec<ToolDefinition>,
        streaming: bool,
    ) -> Result<Box<dyn AgentSession>, AgentError>;

    async fn create_session(
        &self,
        config: SessionConfig,
    ) -> Result<Box<dyn AgentSession>, AgentError>;

    async fn list_sessions(&self) -> Result<Vec<SessionInfo>, AgentError>;

    async fn delete_session(&self, session_id: &str) -> Result<(), AgentError>;
}
