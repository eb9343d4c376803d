use crate::{VoteRepositoryError, VoteTransaction};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::Row;
use sqlx::types::Json;
use vote_ledger_shared::types::{ItemDocument, ItemRef, VoteRecord, VoterId};

/// A vote transaction backed by a PostgreSQL transaction.
///
/// `load_item` takes a row lock on the item, so every other vote transaction on
/// the same item waits in `load_item` until this one commits or rolls back.
/// Dropping the value without committing rolls the transaction back.
pub struct PostgresVoteTransaction {
    item: ItemRef,
    tx: sqlx::Transaction<'static, sqlx::Postgres>,
}

impl PostgresVoteTransaction {
    pub(crate) fn new(item: ItemRef, tx: sqlx::Transaction<'static, sqlx::Postgres>) -> Self {
        Self { item, tx }
    }
}

#[async_trait]
impl VoteTransaction for PostgresVoteTransaction {
    async fn load_item(&mut self) -> Result<Option<ItemDocument>, VoteRepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT data
            FROM items
            WHERE collection_path = $1 AND item_id = $2
            FOR UPDATE
            "#,
        )
        .bind(&self.item.collection_path)
        .bind(&self.item.item_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        match row {
            Some(row) => {
                let Json(data) = row.try_get::<Json<Value>, _>("data")?;
                Ok(Some(ItemDocument::from_value(data)))
            }
            None => Ok(None),
        }
    }

    async fn load_vote(&mut self, voter: &VoterId) -> Result<Option<VoteRecord>, VoteRepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT data
            FROM item_votes
            WHERE collection_path = $1 AND item_id = $2 AND voter_id = $3
            "#,
        )
        .bind(&self.item.collection_path)
        .bind(&self.item.item_id)
        .bind(voter.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;

        match row {
            Some(row) => {
                let Json(data) = row.try_get::<Json<Value>, _>("data")?;
                Ok(Some(VoteRecord::from_document(data, voter)?))
            }
            None => Ok(None),
        }
    }

    async fn write_item(&mut self, document: &ItemDocument) -> Result<(), VoteRepositoryError> {
        sqlx::query("UPDATE items SET data = $3 WHERE collection_path = $1 AND item_id = $2")
            .bind(&self.item.collection_path)
            .bind(&self.item.item_id)
            .bind(Json(&document.fields))
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn put_vote(&mut self, record: &VoteRecord) -> Result<(), VoteRepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO item_votes (collection_path, item_id, voter_id, data)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (collection_path, item_id, voter_id)
            DO UPDATE SET data = EXCLUDED.data
            "#,
        )
        .bind(&self.item.collection_path)
        .bind(&self.item.item_id)
        .bind(record.voter_id.as_str())
        .bind(Json(record.to_document()))
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete_vote(&mut self, voter: &VoterId) -> Result<(), VoteRepositoryError> {
        sqlx::query(
            "DELETE FROM item_votes WHERE collection_path = $1 AND item_id = $2 AND voter_id = $3",
        )
        .bind(&self.item.collection_path)
        .bind(&self.item.item_id)
        .bind(voter.as_str())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), VoteRepositoryError> {
        let this = *self;
        this.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), VoteRepositoryError> {
        let this = *self;
        this.tx.rollback().await?;
        Ok(())
    }
}
