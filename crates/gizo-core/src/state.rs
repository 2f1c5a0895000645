//! Persisted connection state.
//!
//! The state file is the only durable data the SDK owns. It records which
//! dispatcher the last session used and the key pair that dispatcher issued:
//!
//! ```json
//! {"dispatcher": "gizo://<pub>@10.0.0.7:9995", "keys": {"pub": "..", "priv": ".."}}
//! ```
//!
//! `keys` may be `null`. The file is rewritten in full on every save; there is
//! no locking, so two processes sharing one path will race.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Caller identity issued by a dispatcher.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    #[serde(rename = "pub")]
    pub public: String,
    #[serde(rename = "priv")]
    pub private: String,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .field("private", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub dispatcher: String,
    pub keys: Option<KeyPair>,
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, serde_json::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(serde_json::Error),
}

/// Reads and writes [`ConnectionState`] at a fixed path.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load persisted state. `Ok(None)` when the file does not exist.
    pub fn load(&self) -> Result<Option<ConnectionState>, StateError> {
        if !self.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| StateError::ReadFailed(self.path.clone(), e))?;
        let state = serde_json::from_str(&text)
            .map_err(|e| StateError::ParseFailed(self.path.clone(), e))?;
        Ok(Some(state))
    }

    pub fn save(&self, state: &ConnectionState) -> Result<(), StateError> {
        let json = serde_json::to_string(state).map_err(StateError::SerializeFailed)?;
        std::fs::write(&self.path, json)
            .map_err(|e| StateError::WriteFailed(self.path.clone(), e))?;
        tracing::debug!(path = %self.path.display(), dispatcher = %state.dispatcher, "connection state saved");
        Ok(())
    }
}
