//! Typed HTTP client for the agent runtime's session API.
//!
//! A turn is one `POST /session/{id}/message` whose response body is a
//! stream of newline-delimited JSON events. Assistant events are forwarded
//! into the session's event channel; `tool_call` events are dispatched
//! through the tool registry and answered back to the runtime before the
//! stream continues.

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::runtime::{AgentRuntime, AgentSession};
use super::types::{SessionConfig, SessionEvent, SessionInfo};
use crate::error::AgentError;
use crate::tools::{ToolContext, ToolDefinition, ToolRegistry};

pub struct AgentClient {
    base_url: String,
    http: reqwest::Client,
    registry: Arc<ToolRegistry>,
    context: ToolContext,
}

impl AgentClient {
    pub fn new(base_url: &str, registry: Arc<ToolRegistry>, context: ToolContext) -> Self {
        AgentClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            registry,
            context,
        }
    }

    fn session(&self, session_id: String) -> HttpSession {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        HttpSession {
            base_url: self.base_url.clone(),
            http: self.http.clone(),
            session_id,
            registry: self.registry.clone(),
            context: self.context.clone(),
            events_tx,
            events_rx: Some(events_rx),
            released: false,
        }
    }
}

#[async_trait]
impl AgentRuntime for AgentClient {
    async fn resume_session(
        &self,
        session_id: &str,
        tools: Vec<ToolDefinition>,
        streaming: bool,
    ) -> Result<Box<dyn AgentSession>, AgentError> {
        let resp = self
            .http
            .post(format!("{}/session/{}/resume", self.base_url, session_id))
            .json(&json!({ "tools": tools, "streaming": streaming }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AgentError::Transport(format!(
                "resume {} failed: HTTP {}: {}",
                session_id, status, body
            )));
        }

        Ok(Box::new(self.session(session_id.to_string())))
    }

    async fn create_session(
        &self,
        config: SessionConfig,
    ) -> Result<Box<dyn AgentSession>, AgentError> {
        let session_id = config.session_id.clone();
        let resp = self
            .http
            .post(format!("{}/session", self.base_url))
            .json(&config)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AgentError::Transport(format!(
                "create session failed: HTTP {}: {}",
                status, body
            )));
        }

        Ok(Box::new(self.session(session_id)))
    }

    async fn list_sessions(&self) -> Result<Vec<SessionInfo>, AgentError> {
        let resp = self
            .http
            .get(format!("{}/session", self.base_url))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AgentError::Transport(format!(
                "list sessions failed: HTTP {}: {}",
                status, body
            )));
        }

        Ok(resp.json::<Vec<SessionInfo>>().await?)
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), AgentError> {
        let resp = self
            .http
            .delete(format!("{}/session/{}", self.base_url, session_id))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AgentError::Transport(format!(
                "delete session failed: HTTP {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}

/// Wire shape of one event line in a turn's response stream.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireEvent {
    MessageDelta {
        text: String,
    },
    Message {
        text: String,
    },
    ToolCall {
        id: String,
        name: String,
        #[serde(default)]
        arguments: Value,
    },
    Idle,
    Error {
        detail: String,
    },
}

/// Pop every finished line out of the byte buffer, leaving any partial
/// trailing line in place. Splitting happens on raw bytes so a multibyte
/// character straddling two transport chunks is only decoded once its
/// line is complete.
fn drain_complete_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
        let line_bytes: Vec<u8> = buffer.drain(..=newline).collect();
        let line = String::from_utf8_lossy(&line_bytes[..newline])
            .trim()
            .to_string();
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

struct HttpSession {
    base_url: String,
    http: reqwest::Client,
    session_id: String,
    registry: Arc<ToolRegistry>,
    context: ToolContext,
    events_tx: UnboundedSender<SessionEvent>,
    events_rx: Option<UnboundedReceiver<SessionEvent>>,
    released: bool,
}

impl HttpSession {
    /// Forward an event; the consumer may already be gone, which is fine.
    fn forward(&self, event: SessionEvent) {
        let _ = self.events_tx.send(event);
    }

    async fn answer_tool_call(&self, call_id: &str, name: &str, arguments: Value) {
        let result = self.registry.execute(name, arguments, &self.context).await;
        let resp = self
            .http
            .post(format!(
                "{}/session/{}/tool_result",
                self.base_url, self.session_id
            ))
            .json(&json!({ "call_id": call_id, "result": result }))
            .send()
            .await;
        if let Err(e) = resp {
            log::warn!("failed to deliver result for tool call {}: {}", call_id, e);
        }
    }

    async fn drive_turn(&self, prompt: &str) -> Result<(), AgentError> {
        let resp = self
            .http
            .post(format!("{}/session/{}/message", self.base_url, self.session_id))
            .json(&json!({ "prompt": prompt }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(AgentError::Transport(format!(
                "send message failed: HTTP {}: {}",
                status, body
            )));
        }

        let mut stream = resp.bytes_stream();
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            buffer.extend_from_slice(&chunk);

            for line in drain_complete_lines(&mut buffer) {
                let event: WireEvent = match serde_json::from_str(&line) {
                    Ok(event) => event,
                    Err(e) => {
                        log::warn!("skipping unparseable event line: {} ({})", line, e);
                        continue;
                    }
                };

                match event {
                    WireEvent::MessageDelta { text } => {
                        self.forward(SessionEvent::MessageDelta(text));
                    }
                    WireEvent::Message { text } => {
                        self.forward(SessionEvent::Message(text));
                    }
                    WireEvent::ToolCall { id, name, arguments } => {
                        self.answer_tool_call(&id, &name, arguments).await;
                    }
                    WireEvent::Idle => {
                        self.forward(SessionEvent::Idle);
                        return Ok(());
                    }
                    WireEvent::Error { detail } => {
                        self.forward(SessionEvent::Error(detail.clone()));
                        return Err(AgentError::Turn(detail));
                    }
                }
            }
        }

        Err(AgentError::Transport(
            "event stream ended before turn completion".to_string(),
        ))
    }
}

#[async_trait]
impl AgentSession for HttpSession {
    fn take_events(&mut self) -> Option<UnboundedReceiver<SessionEvent>> {
        self.events_rx.take()
    }

    async fn send_and_wait(&mut self, prompt: &str, timeout: Duration) -> Result<(), AgentError> {
        match tokio::time::timeout(timeout, self.drive_turn(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(AgentError::Timeout(timeout)),
        }
    }

    async fn destroy(&mut self) -> Result<(), AgentError> {
        // Local handle release only; the durable session stays resumable.
        if self.released {
            return Ok(());
        }
        self.released = true;
        log::debug!("released session handle {}", self.session_id);
        Ok(())
    }
}
