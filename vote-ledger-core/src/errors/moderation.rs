//! Error types for the moderation collaborator.
use thiserror::Error;
use vote_ledger_repository::VoteRepositoryError;

/// Represents errors that can occur while applying an auto-hide.
#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("Vote repository error: {0}")]
    Repository(#[from] VoteRepositoryError),
}
