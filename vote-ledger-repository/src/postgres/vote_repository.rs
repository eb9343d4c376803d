use crate::postgres::{MIGRATOR, PostgresVoteTransaction};
use crate::{VoteRepository, VoteRepositoryError, VoteTransaction};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::Row;
use sqlx::types::Json;
use tracing::debug;
use vote_ledger_shared::types::{ItemDocument, ItemRef, VoteRecord, VoterId};

/// PostgreSQL implementation of the vote ledger repository.
///
/// Provides database operations for items and vote records using
/// PostgreSQL with connection pooling and transaction support.
pub struct PostgresVoteRepository {
    pool: sqlx::PgPool,
}

impl PostgresVoteRepository {
    /// Creates a new PostgreSQL repository instance.
    ///
    /// # Arguments
    ///
    /// * `pool` - Configured PostgreSQL connection pool
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresVoteRepository)` - Ready-to-use repository instance
    /// * `Err(VoteRepositoryError)` - Future validation errors (currently always succeeds)
    pub async fn new(pool: sqlx::PgPool) -> Result<Self, VoteRepositoryError> {
        Ok(Self { pool })
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<(), VoteRepositoryError> {
        MIGRATOR.run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl VoteRepository for PostgresVoteRepository {
    async fn begin(&self, item: &ItemRef) -> Result<Box<dyn VoteTransaction>, VoteRepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresVoteTransaction::new(item.clone(), tx)))
    }

    async fn get_vote(
        &self,
        item: &ItemRef,
        voter: &VoterId,
    ) -> Result<Option<VoteRecord>, VoteRepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT data
            FROM item_votes
            WHERE collection_path = $1 AND item_id = $2 AND voter_id = $3
            "#,
        )
        .bind(&item.collection_path)
        .bind(&item.item_id)
        .bind(voter.as_str())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let Json(data) = row.try_get::<Json<Value>, _>("data")?;
                Ok(Some(VoteRecord::from_document(data, voter)?))
            }
            None => Ok(None),
        }
    }

    /// Retrieves a voter's records for a batch of items.
    ///
    /// Uses PostgreSQL's UNNEST function to look up every collection/item pair
    /// in a single query.
    async fn get_user_votes(
        &self,
        items: &[ItemRef],
        voter: &VoterId,
    ) -> Result<Vec<(ItemRef, VoteRecord)>, VoteRepositoryError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let collection_paths: Vec<String> = items.iter().map(|i| i.collection_path.clone()).collect();
        let item_ids: Vec<String> = items.iter().map(|i| i.item_id.clone()).collect();

        let rows = sqlx::query(
            r#"
            SELECT collection_path, item_id, data
            FROM item_votes
            WHERE voter_id = $3
              AND (collection_path, item_id) IN (SELECT * FROM UNNEST($1::text[], $2::text[]))
            "#,
        )
        .bind(&collection_paths)
        .bind(&item_ids)
        .bind(voter.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut votes = Vec::with_capacity(rows.len());
        for row in rows {
            let item = ItemRef::new(
                row.try_get::<String, _>("collection_path")?,
                row.try_get::<String, _>("item_id")?,
            );
            let Json(data) = row.try_get::<Json<Value>, _>("data")?;
            votes.push((item, VoteRecord::from_document(data, voter)?));
        }
        debug!(voter_id = %voter, requested = items.len(), found = votes.len(), "Loaded user votes");
        Ok(votes)
    }

    async fn get_item(&self, item: &ItemRef) -> Result<Option<ItemDocument>, VoteRepositoryError> {
        let row = sqlx::query("SELECT data FROM items WHERE collection_path = $1 AND item_id = $2")
            .bind(&item.collection_path)
            .bind(&item.item_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let Json(data) = row.try_get::<Json<Value>, _>("data")?;
                Ok(Some(ItemDocument::from_value(data)))
            }
            None => Ok(None),
        }
    }

    async fn put_item(
        &self,
        item: &ItemRef,
        document: &ItemDocument,
    ) -> Result<(), VoteRepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO items (collection_path, item_id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection_path, item_id)
            DO UPDATE SET data = EXCLUDED.data
            "#,
        )
        .bind(&item.collection_path)
        .bind(&item.item_id)
        .bind(Json(&document.fields))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Sets the moderation fields in one conditional update so concurrent
    /// callers cannot both report a fresh hide.
    async fn hide_item(
        &self,
        item: &ItemRef,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, VoteRepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE items
            SET data = data || jsonb_build_object('isHidden', true, 'hiddenAt', $3::text, 'hiddenReason', $4::text)
            WHERE collection_path = $1
              AND item_id = $2
              AND COALESCE(data->'isHidden', 'false'::jsonb) <> 'true'::jsonb
            "#,
        )
        .bind(&item.collection_path)
        .bind(&item.item_id)
        .bind(at.to_rfc3339())
        .bind(reason)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn check_tables_created(&self) -> Result<bool, VoteRepositoryError> {
        let tables = ["items", "item_votes"];
        for table in tables {
            let table_exists: bool = sqlx::query_scalar(
                r#"
                SELECT EXISTS(SELECT 1 FROM information_schema.tables WHERE table_name = $1)
                "#,
            )
            .bind(table)
            .fetch_one(&self.pool)
            .await?;
            if !table_exists {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
