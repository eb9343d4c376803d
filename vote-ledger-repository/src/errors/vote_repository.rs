//! Error types for the vote repository.
//! Defines specific errors that can occur during database operations related to votes.
use thiserror::Error;
use vote_ledger_shared::types::VoteRecordError;

/// Represents errors that can occur within the vote repository.
///
/// This enum consolidates the error conditions of the storage backends,
/// such as SQLx errors or stored documents that cannot be decoded.
#[derive(Debug, Error)]
pub enum VoteRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid vote record: {0}")]
    InvalidVoteRecord(#[from] VoteRecordError),
}
