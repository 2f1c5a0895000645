//! gizo-client: connects to a Gizo dispatcher and exposes its remote
//! procedures.
//!
//! [`Gizo::connect`] runs the bootstrap protocol once: reuse the dispatcher
//! recorded in the state file if it still answers its health probe,
//! otherwise connect to an explicitly configured dispatcher, otherwise ask
//! the registry for candidates and adopt the first reachable one. The
//! resulting [`Session`] is owned by the facade for the rest of the process.

pub mod bootstrap;
pub mod error;
pub mod facade;
pub mod registry;
pub mod rpc;

pub use bootstrap::{Bootstrapper, Session};
pub use error::{Error, Result};
pub use facade::Gizo;
pub use registry::RegistryClient;
pub use rpc::{RpcConnection, Transport};

pub use gizo_core::{
    EndpointDescriptor, Env, Envs, ExecParams, ExecState, GizoConfig, JobRequest, JobRequests,
    KeyPair, Priority,
};
