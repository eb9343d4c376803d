mod ledger;
mod moderation;

pub use ledger::LedgerError;
pub use moderation::ModerationError;
