//! This module defines the `VoteRepository` trait, which provides an interface
//! for interacting with the underlying data store for items and vote records.
//! It abstracts the database operations for transactional voting, reads and moderation.
use crate::errors::VoteRepositoryError;
use chrono::{DateTime, Utc};
use vote_ledger_shared::types::{ItemDocument, ItemRef, VoteRecord, VoterId};

/// A trait that defines the interface for interacting with the vote data store.
///
/// Implementors provide an atomic read-modify-write unit scoped to one item
/// (`begin`) plus the plain reads and writes used around it.
#[async_trait::async_trait]
pub trait VoteRepository: Send + Sync {
    /// Opens a transaction scoped to `item`.
    ///
    /// Concurrent transactions on the same item must be serialized: a
    /// transaction that has loaded the item observes every write committed
    /// before it and no write committed after it until it finishes.
    ///
    /// # Arguments
    ///
    /// * `item` - The item whose tally and vote records the transaction touches.
    ///
    /// # Returns
    ///
    /// A boxed `VoteTransaction`, or a `VoteRepositoryError` if it cannot be opened.
    async fn begin(&self, item: &ItemRef) -> Result<Box<dyn VoteTransaction>, VoteRepositoryError>;

    /// Reads a voter's vote on an item outside of any transaction.
    ///
    /// Legacy numeric records are normalized to the direction label.
    ///
    /// # Arguments
    ///
    /// * `item` - The item voted on.
    /// * `voter` - The voter whose record is read.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(VoteRecord))` - The voter has a vote on the item
    /// * `Ok(None)` - No vote recorded
    /// * `Err(VoteRepositoryError)` - Database failure or undecodable record
    async fn get_vote(
        &self,
        item: &ItemRef,
        voter: &VoterId,
    ) -> Result<Option<VoteRecord>, VoteRepositoryError>;

    /// Reads a voter's votes on a batch of items.
    ///
    /// Items the voter has not voted on are absent from the result.
    async fn get_user_votes(
        &self,
        items: &[ItemRef],
        voter: &VoterId,
    ) -> Result<Vec<(ItemRef, VoteRecord)>, VoteRepositoryError>;

    /// Reads an item document.
    async fn get_item(&self, item: &ItemRef) -> Result<Option<ItemDocument>, VoteRepositoryError>;

    /// Creates or replaces an item document.
    ///
    /// Items are owned by other services; this exists for seeding and imports.
    async fn put_item(
        &self,
        item: &ItemRef,
        document: &ItemDocument,
    ) -> Result<(), VoteRepositoryError>;

    /// Hides an item unless it is already hidden.
    ///
    /// # Arguments
    ///
    /// * `item` - The item to hide.
    /// * `reason` - Moderation reason stored on the item.
    /// * `at` - Time recorded as `hiddenAt`.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The item was visible and is now hidden
    /// * `Ok(false)` - The item was already hidden or does not exist
    /// * `Err(VoteRepositoryError)` - Database failure
    async fn hide_item(
        &self,
        item: &ItemRef,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, VoteRepositoryError>;

    /// Checks that the backing tables exist.
    async fn check_tables_created(&self) -> Result<bool, VoteRepositoryError>;
}

/// An open atomic unit over one item and its vote records.
///
/// Writes become visible only on `commit`. Dropping the transaction without
/// committing discards every write.
#[async_trait::async_trait]
pub trait VoteTransaction: Send {
    /// Loads the item document, taking the item lock where the backend needs one.
    async fn load_item(&mut self) -> Result<Option<ItemDocument>, VoteRepositoryError>;

    /// Loads a voter's record on the transaction's item, normalized.
    async fn load_vote(&mut self, voter: &VoterId) -> Result<Option<VoteRecord>, VoteRepositoryError>;

    /// Replaces the item document.
    async fn write_item(&mut self, document: &ItemDocument) -> Result<(), VoteRepositoryError>;

    /// Creates or replaces the voter's record. Always stored in label encoding.
    async fn put_vote(&mut self, record: &VoteRecord) -> Result<(), VoteRepositoryError>;

    /// Deletes the voter's record if present.
    async fn delete_vote(&mut self, voter: &VoterId) -> Result<(), VoteRepositoryError>;

    /// Makes every write of the transaction visible atomically.
    async fn commit(self: Box<Self>) -> Result<(), VoteRepositoryError>;

    /// Discards every write of the transaction.
    async fn rollback(self: Box<Self>) -> Result<(), VoteRepositoryError>;
}
