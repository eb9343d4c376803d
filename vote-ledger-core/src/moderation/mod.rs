//! This module defines the `Moderation` collaborator the ledger notifies when
//! an item's downvotes reach the configured threshold, together with the
//! repository-backed implementation that hides such items.
mod auto_hide;
mod config;

pub use auto_hide::AutoHideModerator;
pub use config::{DEFAULT_AUTO_HIDE_THRESHOLD, ModerationConfig};

use crate::errors::ModerationError;
use vote_ledger_shared::types::ItemRef;

/// Moderation collaborator invoked after a vote pushes downvotes to the threshold.
///
/// Implementations own idempotence: calling again for an already hidden item
/// must not hide it a second time and must report `false`.
#[async_trait::async_trait]
pub trait Moderation: Send + Sync {
    /// Hides the item if the moderation policy says so.
    ///
    /// # Arguments
    ///
    /// * `item` - The collection path and id of the voted item.
    /// * `downvotes` - The item's downvote count after the vote committed.
    ///
    /// # Returns
    ///
    /// `Ok(true)` only if this call freshly hid the item.
    async fn check_and_apply_auto_hide(
        &self,
        item: &ItemRef,
        downvotes: i64,
    ) -> Result<bool, ModerationError>;
}

/// Moderation that never hides anything.
pub struct NoopModeration;

#[async_trait::async_trait]
impl Moderation for NoopModeration {
    async fn check_and_apply_auto_hide(
        &self,
        _item: &ItemRef,
        _downvotes: i64,
    ) -> Result<bool, ModerationError> {
        Ok(false)
    }
}
