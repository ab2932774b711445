//! Daily session continuity.
//!
//! One calendar day maps to one durable session id. A turn resumes today's
//! session when the runtime still has it and creates it otherwise. System
//! instructions travel on the dedicated system-message channel at creation;
//! on resume they are re-asserted by prefixing the outgoing turn, because a
//! resumed session may predate this process and the resumption channel does
//! not replay the original instructions.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::runtime::AgentRuntime;
use super::system_prompt;
use super::types::{SessionConfig, SessionEvent, SystemMessageConfig};
use crate::error::AgentError;
use crate::storage::today_string;
use crate::tools::ToolRegistry;

/// Fixed turn timeout.
pub const TURN_TIMEOUT: Duration = Duration::from_secs(120);

const SESSION_KEY_PREFIX: &str = "assistant";

/// Deterministic session id for a calendar date (YYYY-MM-DD).
pub fn session_key(date: &str) -> String {
    format!("{}-{}", SESSION_KEY_PREFIX, date)
}

/// Destination for streamed reply chunks, written in arrival order.
pub trait OutputSink: Send + Sync {
    fn write_chunk(&self, chunk: &str);
}

/// Streams chunks straight to stdout.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write_chunk(&self, chunk: &str) {
        use std::io::Write;
        print!("{}", chunk);
        let _ = std::io::stdout().flush();
    }
}

/// Explicitly constructed context for the session-continuity flow: runtime
/// handle, tool set, and model travel together instead of living in
/// globals.
pub struct DailyAssistant {
    runtime: Arc<dyn AgentRuntime>,
    registry: Arc<ToolRegistry>,
    model: String,
}

impl DailyAssistant {
    pub fn new(runtime: Arc<dyn AgentRuntime>, registry: Arc<ToolRegistry>, model: String) -> Self {
        DailyAssistant {
            runtime,
            registry,
            model,
        }
    }

    /// Send one user utterance through today's session and return the full
    /// accumulated reply. Chunks are forwarded to `sink` as they arrive.
    pub async fn run(&self, prompt: &str, sink: Arc<dyn OutputSink>) -> Result<String, AgentError> {
        let today = today_string();
        let key = session_key(&today);
        let instructions = system_prompt(&today);
        let tools = self.registry.definitions();

        let (mut session, resumed) = match self
            .runtime
            .resume_session(&key, tools.clone(), true)
            .await
        {
            Ok(session) => {
                log::debug!("resumed session {}", key);
                (session, true)
            }
            Err(e) => {
                log::debug!("no session to resume ({}), creating {}", e, key);
                let config = SessionConfig {
                    session_id: key.clone(),
                    model: self.model.clone(),
                    streaming: true,
                    tools,
                    system_message: Some(SystemMessageConfig::append(instructions.clone())),
                };
                (self.runtime.create_session(config).await?, false)
            }
        };

        // A resumed session may have consumed its system instructions in a
        // prior process invocation; re-assert them in the turn itself.
        let outgoing = if resumed {
            format!("{}\n\n{}", instructions, prompt)
        } else {
            prompt.to_string()
        };

        let mut events = session.take_events().ok_or_else(|| {
            AgentError::Transport("session event channel already taken".to_string())
        })?;

        let accumulator = Arc::new(Mutex::new(String::new()));
        let turn_error: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

        let drain = {
            let accumulator = accumulator.clone();
            let turn_error = turn_error.clone();
            let sink = sink.clone();
            tokio::spawn(async move {
                while let Some(event) = events.recv().await {
                    match event {
                        SessionEvent::MessageDelta(text) => {
                            sink.write_chunk(&text);
                            accumulator.lock().unwrap().push_str(&text);
                        }
                        SessionEvent::Message(text) => {
                            let mut acc = accumulator.lock().unwrap();
                            if acc.is_empty() {
                                sink.write_chunk(&text);
                                acc.push_str(&text);
                            }
                        }
                        SessionEvent::Idle => {
                            sink.write_chunk("\n");
                        }
                        SessionEvent::Error(detail) => {
                            *turn_error.lock().unwrap() = Some(detail);
                        }
                    }
                }
            })
        };

        let send_result = session.send_and_wait(&outgoing, TURN_TIMEOUT).await;

        // Scoped release: teardown runs on success, turn error, and timeout
        // alike. Failure to release is logged, never surfaced.
        if let Err(e) = session.destroy().await {
            log::warn!("failed to release session {}: {}", key, e);
        }
        drop(session);
        let _ = drain.await;

        if let Err(transport_err) = send_result {
            // Prefer the runtime-reported turn error when both exist.
            if let Some(detail) = turn_error.lock().unwrap().take() {
                return Err(AgentError::Turn(detail));
            }
            return Err(transport_err);
        }

        let reply = accumulator.lock().unwrap().clone();
        Ok(reply)
    }

    /// Delete today's session if it exists, forcing the next turn to create
    /// a fresh one. Returns whether a session was found; both outcomes are
    /// success.
    pub async fn refresh(&self) -> Result<bool, AgentError> {
        let key = session_key(&today_string());
        let sessions = self.runtime.list_sessions().await?;

        if !sessions.iter().any(|s| s.id == key) {
            return Ok(false);
        }

        self.runtime.delete_session(&key).await?;
        log::info!("deleted session {}", key);
        Ok(true)
    }
}
