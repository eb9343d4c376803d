use crate::errors::ModerationError;
use crate::moderation::{Moderation, ModerationConfig};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};
use vote_ledger_repository::VoteRepository;
use vote_ledger_shared::types::{AUTO_HIDE_REASON, ItemRef};

/// Hides items through the vote repository once their downvotes reach the threshold.
pub struct AutoHideModerator {
    repository: Arc<dyn VoteRepository>,
    config: ModerationConfig,
}

impl AutoHideModerator {
    pub fn new(repository: Arc<dyn VoteRepository>, config: ModerationConfig) -> Self {
        Self { repository, config }
    }
}

#[async_trait]
impl Moderation for AutoHideModerator {
    async fn check_and_apply_auto_hide(
        &self,
        item: &ItemRef,
        downvotes: i64,
    ) -> Result<bool, ModerationError> {
        if !self.config.reaches_threshold(downvotes) {
            return Ok(false);
        }

        let hidden = self
            .repository
            .hide_item(item, AUTO_HIDE_REASON, Utc::now())
            .await?;

        if hidden {
            info!(
                collection_path = %item.collection_path,
                item_id = %item.item_id,
                downvotes,
                threshold = self.config.auto_hide_threshold,
                "Item auto-hidden"
            );
        } else {
            debug!(collection_path = %item.collection_path, item_id = %item.item_id, "Item already hidden or missing");
        }
        Ok(hidden)
    }
}
