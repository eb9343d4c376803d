use crate::types::VoteDirection;
use serde::{Deserialize, Serialize};

/// Result of a vote toggle operation as returned to callers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoteOutcome {
    /// `upvotes - downvotes` after the vote committed.
    pub new_score: i64,
    /// The caller's vote after this call, `None` after a toggle-off.
    pub new_user_vote: Option<VoteDirection>,
    /// Whether this call caused the moderation collaborator to hide the item.
    pub was_auto_hidden: bool,
}
