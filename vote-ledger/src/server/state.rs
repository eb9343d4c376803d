// App state for the Axum server
use std::sync::Arc;
use vote_ledger_core::VoteLedger;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<VoteLedger>,
}
