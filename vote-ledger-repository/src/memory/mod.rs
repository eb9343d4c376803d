//! In-memory implementation of the vote ledger repository.
//!
//! Keeps items and vote documents in process memory. Each item has its own
//! async lock which a transaction holds from `begin` until it is committed,
//! rolled back or dropped, so votes on one item are fully serialized while
//! votes on different items proceed independently. A lock entry lives only
//! while some transaction holds or waits for it. Used by tests and by local
//! runs without a database.
use crate::{VoteRepository, VoteRepositoryError, VoteTransaction};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use vote_ledger_shared::types::{ItemDocument, ItemRef, VoteRecord, VoterId};

#[derive(Default)]
struct MemoryState {
    items: HashMap<ItemRef, ItemDocument>,
    votes: HashMap<ItemRef, HashMap<VoterId, Value>>,
}

/// In-memory vote repository.
#[derive(Clone, Default)]
pub struct InMemoryVoteRepository {
    state: Arc<Mutex<MemoryState>>,
    item_locks: ItemLocks,
}

type ItemLocks = Arc<std::sync::Mutex<HashMap<ItemRef, Arc<Mutex<()>>>>>;

/// Exclusive hold on one item's lock. Removes the lock entry on drop once no
/// other transaction holds or waits for it.
struct ItemLockGuard {
    item: ItemRef,
    locks: ItemLocks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ItemLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Waiters and holders each keep a clone, so a count of one means only the map is left.
        if locks.get(&self.item).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(&self.item);
        }
    }
}

impl InMemoryVoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw vote document as-is, bypassing normalization.
    ///
    /// Lets callers seed records in the legacy numeric encoding.
    pub async fn insert_raw_vote(&self, item: &ItemRef, voter: &VoterId, document: Value) {
        let mut state = self.state.lock().await;
        state
            .votes
            .entry(item.clone())
            .or_default()
            .insert(voter.clone(), document);
    }

    /// Returns the raw stored vote document of a voter.
    pub async fn raw_vote(&self, item: &ItemRef, voter: &VoterId) -> Option<Value> {
        let state = self.state.lock().await;
        state.votes.get(item).and_then(|votes| votes.get(voter)).cloned()
    }

    /// Number of vote records stored for an item.
    pub async fn vote_count(&self, item: &ItemRef) -> usize {
        let state = self.state.lock().await;
        state.votes.get(item).map_or(0, HashMap::len)
    }

    async fn lock_item(&self, item: &ItemRef) -> ItemLockGuard {
        let lock = {
            let mut locks = self.item_locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(item.clone()).or_default().clone()
        };
        ItemLockGuard {
            item: item.clone(),
            locks: self.item_locks.clone(),
            guard: Some(lock.lock_owned().await),
        }
    }

    #[cfg(test)]
    fn tracked_locks(&self) -> usize {
        self.item_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl VoteRepository for InMemoryVoteRepository {
    async fn begin(&self, item: &ItemRef) -> Result<Box<dyn VoteTransaction>, VoteRepositoryError> {
        let guard = self.lock_item(item).await;
        Ok(Box::new(InMemoryVoteTransaction {
            item: item.clone(),
            state: self.state.clone(),
            staged_item: None,
            staged_votes: HashMap::new(),
            _guard: guard,
        }))
    }

    async fn get_vote(
        &self,
        item: &ItemRef,
        voter: &VoterId,
    ) -> Result<Option<VoteRecord>, VoteRepositoryError> {
        match self.raw_vote(item, voter).await {
            Some(document) => Ok(Some(VoteRecord::from_document(document, voter)?)),
            None => Ok(None),
        }
    }

    async fn get_user_votes(
        &self,
        items: &[ItemRef],
        voter: &VoterId,
    ) -> Result<Vec<(ItemRef, VoteRecord)>, VoteRepositoryError> {
        let state = self.state.lock().await;
        let mut votes = Vec::new();
        for item in items {
            if let Some(document) = state.votes.get(item).and_then(|v| v.get(voter)) {
                votes.push((item.clone(), VoteRecord::from_document(document.clone(), voter)?));
            }
        }
        Ok(votes)
    }

    async fn get_item(&self, item: &ItemRef) -> Result<Option<ItemDocument>, VoteRepositoryError> {
        let state = self.state.lock().await;
        Ok(state.items.get(item).cloned())
    }

    async fn put_item(
        &self,
        item: &ItemRef,
        document: &ItemDocument,
    ) -> Result<(), VoteRepositoryError> {
        let _guard = self.lock_item(item).await;
        let mut state = self.state.lock().await;
        state.items.insert(item.clone(), document.clone());
        Ok(())
    }

    async fn hide_item(
        &self,
        item: &ItemRef,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, VoteRepositoryError> {
        let _guard = self.lock_item(item).await;
        let mut state = self.state.lock().await;
        Ok(state
            .items
            .get_mut(item)
            .is_some_and(|document| document.mark_hidden(reason, at)))
    }

    async fn check_tables_created(&self) -> Result<bool, VoteRepositoryError> {
        Ok(true)
    }
}

/// Transaction over one item of an `InMemoryVoteRepository`.
///
/// Writes are staged locally and applied to the shared state on commit.
pub struct InMemoryVoteTransaction {
    item: ItemRef,
    state: Arc<Mutex<MemoryState>>,
    staged_item: Option<ItemDocument>,
    // `None` marks a staged deletion.
    staged_votes: HashMap<VoterId, Option<Value>>,
    _guard: ItemLockGuard,
}

#[async_trait]
impl VoteTransaction for InMemoryVoteTransaction {
    async fn load_item(&mut self) -> Result<Option<ItemDocument>, VoteRepositoryError> {
        if let Some(document) = &self.staged_item {
            return Ok(Some(document.clone()));
        }
        let state = self.state.lock().await;
        Ok(state.items.get(&self.item).cloned())
    }

    async fn load_vote(&mut self, voter: &VoterId) -> Result<Option<VoteRecord>, VoteRepositoryError> {
        let document = match self.staged_votes.get(voter) {
            Some(staged) => staged.clone(),
            None => {
                let state = self.state.lock().await;
                state.votes.get(&self.item).and_then(|v| v.get(voter)).cloned()
            }
        };
        match document {
            Some(document) => Ok(Some(VoteRecord::from_document(document, voter)?)),
            None => Ok(None),
        }
    }

    async fn write_item(&mut self, document: &ItemDocument) -> Result<(), VoteRepositoryError> {
        self.staged_item = Some(document.clone());
        Ok(())
    }

    async fn put_vote(&mut self, record: &VoteRecord) -> Result<(), VoteRepositoryError> {
        self.staged_votes
            .insert(record.voter_id.clone(), Some(record.to_document()));
        Ok(())
    }

    async fn delete_vote(&mut self, voter: &VoterId) -> Result<(), VoteRepositoryError> {
        self.staged_votes.insert(voter.clone(), None);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), VoteRepositoryError> {
        let this = *self;
        let mut state = this.state.lock().await;
        if let Some(document) = this.staged_item {
            state.items.insert(this.item.clone(), document);
        }
        let votes = state.votes.entry(this.item).or_default();
        for (voter, document) in this.staged_votes {
            match document {
                Some(document) => {
                    votes.insert(voter, document);
                }
                None => {
                    votes.remove(&voter);
                }
            }
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), VoteRepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use vote_ledger_shared::types::VoteDirection;

    fn item() -> ItemRef {
        ItemRef::new("campgrounds/yosemite/reviews", "review-1")
    }

    async fn seeded() -> InMemoryVoteRepository {
        let repository = InMemoryVoteRepository::new();
        repository
            .put_item(&item(), &ItemDocument::from_value(json!({"upvotes": 0, "downvotes": 0})))
            .await
            .unwrap();
        repository
    }

    #[tokio::test]
    async fn test_commit_applies_staged_writes() {
        let repository = seeded().await;
        let voter = VoterId::new("camper-1");

        let mut tx = repository.begin(&item()).await.unwrap();
        tx.write_item(&ItemDocument::from_value(json!({"upvotes": 1, "downvotes": 0})))
            .await
            .unwrap();
        tx.put_vote(&VoteRecord::new(voter.clone(), VoteDirection::Up, Utc::now()))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let stored = repository.get_item(&item()).await.unwrap().unwrap();
        assert_eq!(stored.tally().upvotes, 1);
        let vote = repository.get_vote(&item(), &voter).await.unwrap().unwrap();
        assert_eq!(vote.direction, VoteDirection::Up);
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let repository = seeded().await;
        let voter = VoterId::new("camper-1");

        {
            let mut tx = repository.begin(&item()).await.unwrap();
            tx.put_vote(&VoteRecord::new(voter.clone(), VoteDirection::Down, Utc::now()))
                .await
                .unwrap();
        }

        assert!(repository.get_vote(&item(), &voter).await.unwrap().is_none());
        assert_eq!(repository.vote_count(&item()).await, 0);
    }

    #[tokio::test]
    async fn test_transaction_reads_its_own_writes() {
        let repository = seeded().await;
        let voter = VoterId::new("camper-1");
        repository
            .insert_raw_vote(&item(), &voter, json!({"voterId": "camper-1", "value": 1}))
            .await;

        let mut tx = repository.begin(&item()).await.unwrap();
        assert_eq!(
            tx.load_vote(&voter).await.unwrap().map(|v| v.direction),
            Some(VoteDirection::Up)
        );
        tx.delete_vote(&voter).await.unwrap();
        assert!(tx.load_vote(&voter).await.unwrap().is_none());
        tx.rollback().await.unwrap();

        assert!(repository.get_vote(&item(), &voter).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_second_transaction_waits_for_first() {
        let repository = seeded().await;
        let tx = repository.begin(&item()).await.unwrap();

        let blocked = tokio::time::timeout(Duration::from_millis(50), repository.begin(&item())).await;
        assert!(blocked.is_err());

        drop(tx);
        let tx = tokio::time::timeout(Duration::from_millis(500), repository.begin(&item())).await;
        assert!(tx.is_ok());
    }

    #[tokio::test]
    async fn test_item_locks_released_after_transactions() {
        let repository = seeded().await;

        for i in 0..1000 {
            let missing = ItemRef::new("feedback", format!("missing-{i}"));
            let mut tx = repository.begin(&missing).await.unwrap();
            assert!(tx.load_item().await.unwrap().is_none());
            tx.rollback().await.unwrap();
        }
        assert_eq!(repository.tracked_locks(), 0);

        let tx = repository.begin(&item()).await.unwrap();
        assert_eq!(repository.tracked_locks(), 1);
        tx.commit().await.unwrap();
        repository.hide_item(&item(), "auto_downvotes", Utc::now()).await.unwrap();
        assert_eq!(repository.tracked_locks(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_waiting_transaction_keeps_lock_entry() {
        let repository = seeded().await;
        let first = repository.begin(&item()).await.unwrap();

        let waiter = {
            let repository = repository.clone();
            tokio::spawn(async move {
                let tx = repository.begin(&item()).await.unwrap();
                tx.commit().await.unwrap();
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        drop(first);
        assert!(repository.tracked_locks() <= 1);
        waiter.await.unwrap();
        assert_eq!(repository.tracked_locks(), 0);
    }

    #[tokio::test]
    async fn test_hide_item_only_once() {
        let repository = seeded().await;
        assert!(repository.hide_item(&item(), "auto_downvotes", Utc::now()).await.unwrap());
        assert!(!repository.hide_item(&item(), "auto_downvotes", Utc::now()).await.unwrap());

        let missing = ItemRef::new("campgrounds/yosemite/reviews", "missing");
        assert!(!repository.hide_item(&missing, "auto_downvotes", Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_user_votes_skips_items_without_votes() {
        let repository = seeded().await;
        let voter = VoterId::new("camper-1");
        let other = ItemRef::new("campgrounds/yosemite/photos", "photo-9");
        repository
            .insert_raw_vote(&item(), &voter, json!({"voteType": "down"}))
            .await;

        let votes = repository
            .get_user_votes(&[item(), other], &voter)
            .await
            .unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].0, item());
        assert_eq!(votes[0].1.direction, VoteDirection::Down);
    }
}
