// Request and response bodies of the HTTP surface
use serde::{Deserialize, Serialize};
use vote_ledger_shared::types::{ItemRef, ItemTally, VoteDirection, VoteRecord};

/// Body of `POST /votes`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[serde(flatten)]
    pub item: ItemRef,
    pub direction: VoteDirection,
}

/// Body of `GET /votes`.
#[derive(Debug, Clone, Serialize)]
pub struct UserVoteResponse {
    pub vote: Option<VoteRecord>,
}

/// Body of `POST /votes/batch`.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchVotesRequest {
    pub items: Vec<ItemRef>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemVote {
    #[serde(flatten)]
    pub item: ItemRef,
    pub direction: VoteDirection,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchVotesResponse {
    pub votes: Vec<ItemVote>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreResponse {
    pub upvotes: i64,
    pub downvotes: i64,
    pub score: i64,
}

impl From<ItemTally> for ScoreResponse {
    fn from(tally: ItemTally) -> Self {
        Self {
            upvotes: tally.upvotes,
            downvotes: tally.downvotes,
            score: tally.score(),
        }
    }
}
