//! gizo-core: dispatcher addressing, persisted connection state, job
//! request payloads and encoding helpers. No network I/O happens here.
//! `gizo-client` builds the bootstrap protocol and RPC surface on top.

pub mod config;
pub mod encoding;
pub mod endpoint;
pub mod job;
pub mod state;

pub use config::GizoConfig;
pub use endpoint::{EndpointDescriptor, EndpointError};
pub use job::{Env, Envs, ExecParams, ExecState, JobRequest, JobRequests, Priority};
pub use state::{ConnectionState, KeyPair, StateError, StateStore};
