//! # Vote Ledger Core
//! This crate implements the vote ledger: one vote per voter per item,
//! toggle/switch voting with the item tally kept consistent inside a single
//! repository transaction, and the moderation collaborator that hides items
//! once their downvotes reach a threshold.
pub mod errors;
pub mod ledger;
pub mod moderation;

pub use errors::{LedgerError, ModerationError};
pub use ledger::VoteLedger;
pub use moderation::{AutoHideModerator, Moderation, ModerationConfig, NoopModeration};
