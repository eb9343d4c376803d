// Mapping of ledger failures onto HTTP responses
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;
use vote_ledger_core::LedgerError;
use vote_ledger_repository::VoteRepositoryError;

/// Error returned by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Ledger(LedgerError::NotSignedIn) => StatusCode::UNAUTHORIZED,
            ApiError::Ledger(LedgerError::ItemNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Ledger(LedgerError::Repository(VoteRepositoryError::InvalidVoteRecord(_))) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Ledger(LedgerError::Repository(_)) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (
            status,
            Json(json!({
                "status": "error",
                "message": self.to_string(),
            })),
        )
            .into_response()
    }
}
