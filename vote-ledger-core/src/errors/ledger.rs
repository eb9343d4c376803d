//! Error types for the vote ledger.
//! Defines the errors surfaced to callers of `VoteLedger`.
use thiserror::Error;
use vote_ledger_repository::VoteRepositoryError;
use vote_ledger_shared::types::ItemRef;

/// Represents errors that can occur while reading or casting votes.
///
/// `NotSignedIn` and `ItemNotFound` abort before anything is written.
/// Repository errors are transient from the caller's point of view: the
/// same `vote` call may be issued again.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("A signed-in voter is required to vote")]
    NotSignedIn,

    #[error("Item not found: {0}")]
    ItemNotFound(ItemRef),

    #[error("Vote repository error: {0}")]
    Repository(#[from] VoteRepositoryError),
}
