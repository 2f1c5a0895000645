//! CLI command modules.

pub mod chain;
pub mod config;
pub mod connect;
pub mod jobs;
pub mod status;
