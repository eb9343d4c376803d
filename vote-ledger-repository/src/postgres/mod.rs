//! PostgreSQL implementation of the vote ledger repository.
//!
//! Provides a PostgreSQL backend for the `VoteRepository` trait with connection
//! pooling and row-level locking of items inside transactions.
//!
//! ## Key Features
//!
//! - Connection pooling with `sqlx::PgPool`
//! - `SELECT ... FOR UPDATE` on the item row serializes concurrent votes on one item
//! - Item and vote documents stored as `JSONB` so both tally namings and both
//!   vote encodings survive untouched
//! - Embedded migrations via `sqlx::migrate!`
//!
//! ## Database Tables
//!
//! - `items`: Votable items keyed by collection path and item id
//! - `item_votes`: One vote document per item and voter
mod transaction;
mod vote_repository;

pub use transaction::PostgresVoteTransaction;
pub use vote_repository::PostgresVoteRepository;

/// Migrations creating the `items` and `item_votes` tables.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("src/postgres/migrations");
