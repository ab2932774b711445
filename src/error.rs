//! Error taxonomy.
//!
//! Infrastructure failures (cannot read or write the data files, cannot reach
//! the agent runtime) surface as these errors and escalate to a non-zero
//! process exit. Domain-level failures (no matching task, bad parameters)
//! never appear here: the tool layer converts them into structured, non-fatal
//! tool results the runtime can relay to the user.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures reading or writing the persisted collections.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The data file exists but does not parse as the expected document.
    /// Existing data is never silently replaced with an empty collection.
    #[error("corrupt data file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures talking to the external agent runtime.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent runtime transport failure: {0}")]
    Transport(String),

    #[error("agent runtime request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The runtime reported a turn-level error. Preferred over a generic
    /// transport error when both are available.
    #[error("session turn failed: {0}")]
    Turn(String),

    #[error("turn did not complete within {0:?}")]
    Timeout(Duration),
}
