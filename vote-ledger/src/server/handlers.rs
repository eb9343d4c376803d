// HTTP request handlers
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use vote_ledger_shared::types::{ItemRef, VoteOutcome, VoterId};

use crate::server::error::ApiError;
use crate::server::models::{
    BatchVotesRequest, BatchVotesResponse, ItemVote, ScoreResponse, UserVoteResponse, VoteRequest,
};
use crate::server::state::AppState;

/// Header carrying the authenticated caller's id.
pub const VOTER_ID_HEADER: &str = "x-voter-id";

/// Resolves the caller from the request headers; absent or blank means anonymous.
fn voter_from_headers(headers: &HeaderMap) -> Option<VoterId> {
    headers
        .get(VOTER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(VoterId::from)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Vote ledger is running")
}

/// Returns the caller's vote on one item.
pub async fn get_user_vote(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(item): Query<ItemRef>,
) -> Result<Json<UserVoteResponse>, ApiError> {
    let voter = voter_from_headers(&headers);
    let vote = state.ledger.get_user_vote(&item, voter.as_ref()).await?;
    Ok(Json(UserVoteResponse { vote }))
}

/// Returns the caller's votes on a batch of items.
pub async fn get_user_votes(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BatchVotesRequest>,
) -> Result<Json<BatchVotesResponse>, ApiError> {
    let voter = voter_from_headers(&headers);
    let found = state
        .ledger
        .get_user_votes(&request.items, voter.as_ref())
        .await?;

    // Keep request order.
    let votes = request
        .items
        .into_iter()
        .filter_map(|item| {
            let direction = *found.get(&item)?;
            Some(ItemVote { item, direction })
        })
        .collect();
    Ok(Json(BatchVotesResponse { votes }))
}

/// Casts, switches or withdraws the caller's vote.
pub async fn cast_vote(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<VoteRequest>,
) -> Result<Json<VoteOutcome>, ApiError> {
    let voter = voter_from_headers(&headers);
    let outcome = state
        .ledger
        .vote(&request.item, voter.as_ref(), request.direction)
        .await?;
    Ok(Json(outcome))
}

/// Returns an item's current tally.
pub async fn item_score(
    State(state): State<AppState>,
    Query(item): Query<ItemRef>,
) -> Result<Json<ScoreResponse>, ApiError> {
    let tally = state.ledger.score(&item).await?;
    Ok(Json(tally.into()))
}
