//! Error types for the Vote Ledger service.
//! Consolidates the errors that can stop the service during startup or while serving.
use vote_ledger_repository::VoteRepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Repository error: {0}")]
    Repository(#[from] VoteRepositoryError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
