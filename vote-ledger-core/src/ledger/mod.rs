//! This module defines the `VoteLedger`, which casts and reads votes on
//! arbitrary items.
//!
//! Every `vote` call runs one repository transaction over the item and the
//! caller's vote record: the tally naming is detected, the caller's previous
//! vote is normalized, the toggle/switch transition is applied to both the
//! record and the tally, and everything commits at once. The moderation
//! collaborator is consulted afterwards, outside the transaction.
use crate::errors::LedgerError;
use crate::moderation::{Moderation, ModerationConfig};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use vote_ledger_repository::VoteRepository;
use vote_ledger_shared::types::{
    ItemRef, ItemTally, VoteDirection, VoteOutcome, VoteRecord, VoteTransition, VoterId,
};

/// `VoteLedger` keeps one vote per voter per item and the item's tally in step with them.
pub struct VoteLedger {
    repository: Arc<dyn VoteRepository>,
    moderation: Arc<dyn Moderation>,
    config: ModerationConfig,
}

impl VoteLedger {
    /// Creates a new `VoteLedger`.
    ///
    /// # Arguments
    ///
    /// * `repository` - Store holding items and vote records.
    /// * `moderation` - Collaborator consulted once downvotes reach the threshold.
    /// * `config` - Auto-hide threshold.
    pub fn new(
        repository: Arc<dyn VoteRepository>,
        moderation: Arc<dyn Moderation>,
        config: ModerationConfig,
    ) -> Self {
        Self {
            repository,
            moderation,
            config,
        }
    }

    pub fn config(&self) -> &ModerationConfig {
        &self.config
    }

    /// Returns the caller's vote on an item.
    ///
    /// Anonymous callers have no vote and get `Ok(None)`. Legacy numeric
    /// records are returned in label form.
    #[instrument(skip_all, fields(collection_path = %item.collection_path, item_id = %item.item_id))]
    pub async fn get_user_vote(
        &self,
        item: &ItemRef,
        voter: Option<&VoterId>,
    ) -> Result<Option<VoteRecord>, LedgerError> {
        let Some(voter) = voter else {
            return Ok(None);
        };
        let record = self.repository.get_vote(item, voter).await?;
        debug!(voter_id = %voter, vote = ?record.as_ref().map(|r| r.direction), "Loaded user vote");
        Ok(record)
    }

    /// Returns the caller's votes on a batch of items, keyed by item.
    ///
    /// Items without a vote are absent. Anonymous callers get an empty map.
    pub async fn get_user_votes(
        &self,
        items: &[ItemRef],
        voter: Option<&VoterId>,
    ) -> Result<HashMap<ItemRef, VoteDirection>, LedgerError> {
        let Some(voter) = voter else {
            return Ok(HashMap::new());
        };
        let votes = self.repository.get_user_votes(items, voter).await?;
        Ok(votes
            .into_iter()
            .map(|(item, record)| (item, record.direction))
            .collect())
    }

    /// Returns the current tally of an item.
    pub async fn score(&self, item: &ItemRef) -> Result<ItemTally, LedgerError> {
        let document = self
            .repository
            .get_item(item)
            .await?
            .ok_or_else(|| LedgerError::ItemNotFound(item.clone()))?;
        Ok(document.tally())
    }

    /// Casts, switches or withdraws the caller's vote on an item.
    ///
    /// Voting the direction already held removes the vote; voting the other
    /// direction switches it. The tally and the vote record change in one
    /// transaction. If the committed downvote count reaches the threshold the
    /// moderation collaborator is asked to hide the item; its failure is
    /// logged and reported as "not hidden" since the vote is already durable.
    ///
    /// # Errors
    ///
    /// * `LedgerError::NotSignedIn` - no voter; nothing is read or written
    /// * `LedgerError::ItemNotFound` - the item does not exist; nothing is written
    /// * `LedgerError::Repository` - the store failed; the transaction is rolled back
    #[instrument(skip_all, fields(collection_path = %item.collection_path, item_id = %item.item_id, direction = %direction))]
    pub async fn vote(
        &self,
        item: &ItemRef,
        voter: Option<&VoterId>,
        direction: VoteDirection,
    ) -> Result<VoteOutcome, LedgerError> {
        let voter = voter.ok_or(LedgerError::NotSignedIn)?;

        let (tally, new_user_vote) = self.apply_vote(item, voter, direction).await?;
        let new_score = tally.score();

        info!(
            voter_id = %voter,
            upvotes = tally.upvotes,
            downvotes = tally.downvotes,
            score = new_score,
            new_user_vote = ?new_user_vote,
            "Vote committed"
        );

        let was_auto_hidden = self.check_auto_hide(item, tally.downvotes).await;

        Ok(VoteOutcome {
            new_score,
            new_user_vote,
            was_auto_hidden,
        })
    }

    async fn apply_vote(
        &self,
        item: &ItemRef,
        voter: &VoterId,
        direction: VoteDirection,
    ) -> Result<(ItemTally, Option<VoteDirection>), LedgerError> {
        let mut tx = self.repository.begin(item).await?;

        let Some(mut document) = tx.load_item().await? else {
            tx.rollback().await?;
            return Err(LedgerError::ItemNotFound(item.clone()));
        };

        let mut tally = document.tally();
        let existing = tx.load_vote(voter).await?.map(|record| record.direction);
        let transition = VoteTransition::compute(existing, direction);

        if transition.is_toggle_off() {
            debug!(voter_id = %voter, "Vote toggled off");
            tx.delete_vote(voter).await?;
        } else if let Some(direction) = transition.resulting_vote() {
            tx.put_vote(&VoteRecord::new(voter.clone(), direction, Utc::now()))
                .await?;
        }

        tally.apply(&transition);
        document.set_tally(&tally);
        tx.write_item(&document).await?;
        tx.commit().await?;

        Ok((tally, transition.resulting_vote()))
    }

    async fn check_auto_hide(&self, item: &ItemRef, downvotes: i64) -> bool {
        if !self.config.reaches_threshold(downvotes) {
            return false;
        }
        match self.moderation.check_and_apply_auto_hide(item, downvotes).await {
            Ok(hidden) => hidden,
            Err(e) => {
                warn!(error = %e, downvotes, "Auto-hide check failed after vote");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ModerationError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use vote_ledger_repository::{InMemoryVoteRepository, VoteRepositoryError};
    use vote_ledger_shared::types::ItemDocument;

    /// Mock moderation recording every call.
    struct MockModeration {
        calls: Mutex<Vec<(ItemRef, i64)>>,
        hide: bool,
        should_fail: bool,
    }

    impl MockModeration {
        fn new(hide: bool) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                hide,
                should_fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                should_fail: true,
                ..Self::new(true)
            }
        }

        fn calls(&self) -> Vec<(ItemRef, i64)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Moderation for MockModeration {
        async fn check_and_apply_auto_hide(
            &self,
            item: &ItemRef,
            downvotes: i64,
        ) -> Result<bool, ModerationError> {
            self.calls.lock().unwrap().push((item.clone(), downvotes));
            if self.should_fail {
                return Err(ModerationError::Repository(VoteRepositoryError::DatabaseError(
                    sqlx::Error::PoolClosed,
                )));
            }
            Ok(self.hide)
        }
    }

    fn item() -> ItemRef {
        ItemRef::new("campgrounds/big-sur/reviews", "review-3")
    }

    fn voter(id: &str) -> VoterId {
        VoterId::new(id)
    }

    async fn ledger_with(
        data: serde_json::Value,
        moderation: Arc<MockModeration>,
        threshold: u32,
    ) -> (VoteLedger, Arc<InMemoryVoteRepository>) {
        let repository = Arc::new(InMemoryVoteRepository::new());
        repository
            .put_item(&item(), &ItemDocument::from_value(data))
            .await
            .unwrap();
        let ledger = VoteLedger::new(repository.clone(), moderation, ModerationConfig::new(threshold));
        (ledger, repository)
    }

    #[tokio::test]
    async fn test_get_user_vote_anonymous_is_none() {
        let (ledger, _) = ledger_with(json!({}), Arc::new(MockModeration::new(false)), 3).await;
        assert!(ledger.get_user_vote(&item(), None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_vote_anonymous_fails_without_writes() {
        let (ledger, repository) =
            ledger_with(json!({"upvotes": 1, "downvotes": 0}), Arc::new(MockModeration::new(false)), 3).await;

        let err = ledger.vote(&item(), None, VoteDirection::Up).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotSignedIn));

        let stored = repository.get_item(&item()).await.unwrap().unwrap();
        assert_eq!(stored.tally().upvotes, 1);
        assert_eq!(repository.vote_count(&item()).await, 0);
    }

    #[tokio::test]
    async fn test_vote_missing_item_fails() {
        let (ledger, repository) = ledger_with(json!({}), Arc::new(MockModeration::new(false)), 3).await;
        let missing = ItemRef::new("campgrounds/big-sur/reviews", "gone");

        let err = ledger
            .vote(&missing, Some(&voter("a")), VoteDirection::Up)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::ItemNotFound(ref i) if *i == missing));
        assert_eq!(repository.vote_count(&missing).await, 0);
    }

    #[tokio::test]
    async fn test_downvote_reaching_threshold_reports_auto_hide() {
        let moderation = Arc::new(MockModeration::new(true));
        let (ledger, repository) =
            ledger_with(json!({"upvotes": 5, "downvotes": 2}), moderation.clone(), 3).await;

        let outcome = ledger
            .vote(&item(), Some(&voter("a")), VoteDirection::Down)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            VoteOutcome {
                new_score: 2,
                new_user_vote: Some(VoteDirection::Down),
                was_auto_hidden: true,
            }
        );
        assert_eq!(moderation.calls(), vec![(item(), 3)]);
        let stored = repository.get_item(&item()).await.unwrap().unwrap();
        assert_eq!(stored.fields["upvotes"], 5);
        assert_eq!(stored.fields["downvotes"], 3);
    }

    #[tokio::test]
    async fn test_below_threshold_skips_moderation() {
        let moderation = Arc::new(MockModeration::new(true));
        let (ledger, _) = ledger_with(json!({"upvotes": 0, "downvotes": 0}), moderation.clone(), 3).await;

        let outcome = ledger
            .vote(&item(), Some(&voter("a")), VoteDirection::Down)
            .await
            .unwrap();

        assert!(!outcome.was_auto_hidden);
        assert!(moderation.calls().is_empty());
    }

    #[tokio::test]
    async fn test_moderation_failure_keeps_vote() {
        let moderation = Arc::new(MockModeration::failing());
        let (ledger, repository) =
            ledger_with(json!({"upvotes": 0, "downvotes": 2}), moderation.clone(), 3).await;

        let outcome = ledger
            .vote(&item(), Some(&voter("a")), VoteDirection::Down)
            .await
            .unwrap();

        assert!(!outcome.was_auto_hidden);
        assert_eq!(outcome.new_score, -3);
        assert_eq!(moderation.calls().len(), 1);
        assert_eq!(repository.vote_count(&item()).await, 1);
    }

    #[tokio::test]
    async fn test_toggle_off_restores_score_and_deletes_record() {
        let (ledger, repository) =
            ledger_with(json!({"upvotes": 5, "downvotes": 2}), Arc::new(MockModeration::new(false)), 0).await;
        let a = voter("a");

        let first = ledger.vote(&item(), Some(&a), VoteDirection::Up).await.unwrap();
        assert_eq!(first.new_score, 4);

        let second = ledger.vote(&item(), Some(&a), VoteDirection::Up).await.unwrap();
        assert_eq!(second.new_score, 3);
        assert_eq!(second.new_user_vote, None);
        assert!(ledger.get_user_vote(&item(), Some(&a)).await.unwrap().is_none());
        assert_eq!(repository.vote_count(&item()).await, 0);
    }

    #[tokio::test]
    async fn test_switch_moves_score_by_two() {
        let (ledger, _) =
            ledger_with(json!({"upvotes": 0, "downvotes": 0}), Arc::new(MockModeration::new(false)), 0).await;
        let a = voter("a");

        let up = ledger.vote(&item(), Some(&a), VoteDirection::Up).await.unwrap();
        let down = ledger.vote(&item(), Some(&a), VoteDirection::Down).await.unwrap();
        assert_eq!(up.new_score - down.new_score, 2);
        assert_eq!(down.new_user_vote, Some(VoteDirection::Down));

        let tally = ledger.score(&item()).await.unwrap();
        assert_eq!((tally.upvotes, tally.downvotes), (0, 1));
    }

    #[tokio::test]
    async fn test_score_of_missing_item() {
        let (ledger, _) = ledger_with(json!({}), Arc::new(MockModeration::new(false)), 0).await;
        let missing = ItemRef::new("feedback", "none");
        assert!(matches!(
            ledger.score(&missing).await,
            Err(LedgerError::ItemNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_get_user_votes_batch() {
        let (ledger, repository) =
            ledger_with(json!({"upvotes": 0, "downvotes": 0}), Arc::new(MockModeration::new(false)), 0).await;
        let other = ItemRef::new("campgrounds/big-sur/photos", "photo-1");
        repository
            .put_item(&other, &ItemDocument::from_value(json!({})))
            .await
            .unwrap();
        let a = voter("a");

        ledger.vote(&item(), Some(&a), VoteDirection::Up).await.unwrap();
        ledger.vote(&other, Some(&a), VoteDirection::Down).await.unwrap();

        let votes = ledger
            .get_user_votes(&[item(), other.clone()], Some(&a))
            .await
            .unwrap();
        assert_eq!(votes.get(&item()), Some(&VoteDirection::Up));
        assert_eq!(votes.get(&other), Some(&VoteDirection::Down));
        assert!(ledger.get_user_votes(&[item()], None).await.unwrap().is_empty());
    }
}
