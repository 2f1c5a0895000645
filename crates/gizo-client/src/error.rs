use std::path::PathBuf;

use gizo_core::{EndpointError, StateError};
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced by bootstrap and by remote procedure calls.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    MalformedEndpoint(#[from] EndpointError),
    #[error("unable to connect to dispatcher {url}: {reason}")]
    DispatcherUnreachable { url: String, reason: String },
    #[error("unable to connect to registry at {url}: {reason}")]
    RegistryUnavailable { url: String, reason: String },
    #[error("no dispatchers available ({candidates} candidates tried)")]
    NoDispatcherAvailable { candidates: usize },
    #[error("connection state: {0}")]
    State(#[from] StateError),
    #[error("{method} failed on dispatcher: {message}")]
    RemoteProcedure { method: String, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response from {context}: {reason}")]
    InvalidResponse { context: String, reason: String },
    #[error("failed to encode arguments: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("only anko files accepted, got {0}")]
    InvalidJobFile(PathBuf),
    #[error("failed to read job file {0}: {1}")]
    JobFile(PathBuf, std::io::Error),
}
