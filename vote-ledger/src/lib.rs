//! Vote Ledger Service Library
//!
//! This library wires the vote ledger to its storage backend and exposes it
//! over HTTP, including configuration management and error handling.

pub mod config;
pub mod errors;
pub mod server;

pub use config::{Dependencies, LogFormat, Settings};
pub use errors::ServiceError;
