//! # Vote Ledger Repository
//! This crate provides traits and implementations for interacting with the
//! vote data store. It includes definitions for errors, interfaces,
//! and concrete implementations for PostgreSQL and an in-memory backend.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::VoteRepositoryError;
pub use interfaces::{VoteRepository, VoteTransaction};
pub use memory::InMemoryVoteRepository;
pub use postgres::PostgresVoteRepository;
