//! Error types for the vote ledger repository.
//! Consolidates and re-exports error types related to vote repository operations.
mod vote_repository;

pub use vote_repository::VoteRepositoryError;
