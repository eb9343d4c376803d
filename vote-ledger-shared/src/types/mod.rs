mod item_ref;
mod item_tally;
mod outcome;
mod transition;
mod vote_direction;
mod vote_record;

pub use item_ref::{ItemRef, VoterId};
pub use item_tally::{AUTO_HIDE_REASON, ItemDocument, ItemTally, TallyNaming};
pub use outcome::VoteOutcome;
pub use transition::VoteTransition;
pub use vote_direction::VoteDirection;
pub use vote_record::{StoredVote, VoteRecord, VoteRecordError};
