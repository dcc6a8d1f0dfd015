//! Collaborator seams: where account rows are kept and where fresh account
//! metadata comes from.

use async_trait::async_trait;
use fakescan_core::AccountRecord;
use fakescan_db::{get_account, upsert_account, AccountRow, DbError};
use fakescan_twitter::{FetchOutcome, TwitterClient};
use sqlx::PgPool;

/// Keyed persistence for account rows.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get(&self, username: &str) -> Result<Option<AccountRow>, DbError>;

    /// Inserts or overwrites the row for `record.username`.
    async fn put(&self, record: &AccountRecord) -> Result<(), DbError>;
}

/// Live account metadata provider.
#[async_trait]
pub trait AccountSource: Send + Sync {
    async fn fetch(&self, username: &str) -> FetchOutcome;
}

/// [`AccountStore`] over the `twitter_accounts` table.
#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn get(&self, username: &str) -> Result<Option<AccountRow>, DbError> {
        get_account(&self.pool, username).await
    }

    async fn put(&self, record: &AccountRecord) -> Result<(), DbError> {
        upsert_account(&self.pool, &AccountRow::from(record)).await
    }
}

#[async_trait]
impl AccountSource for TwitterClient {
    async fn fetch(&self, username: &str) -> FetchOutcome {
        self.fetch_account(username).await
    }
}
