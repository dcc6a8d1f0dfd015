//! Database operations for the `twitter_accounts` table.

use chrono::NaiveDateTime;
use fakescan_core::{format_timestamp, parse_timestamp, AccountRecord};
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `twitter_accounts` table.
///
/// `fetched_at` is kept as the stored text; callers decide what an
/// unparseable value means via [`AccountRow::fetched_at`].
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AccountRow {
    pub username: String,
    pub followers_count: Option<i64>,
    pub friends_count: Option<i64>,
    pub statuses_count: Option<i64>,
    pub listed_count: Option<i64>,
    pub created_at: String,
    pub verified: bool,
    pub description: String,
    pub fetched_at: String,
}

impl AccountRow {
    /// Parses the stored fetch time; `None` if the text is not in
    /// `YYYY-MM-DD HH:MM:SS` form.
    #[must_use]
    pub fn fetched_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.fetched_at)
    }

    #[must_use]
    pub fn into_record(self, timestamp: NaiveDateTime) -> AccountRecord {
        AccountRecord {
            username: self.username,
            followers_count: self.followers_count,
            friends_count: self.friends_count,
            statuses_count: self.statuses_count,
            listed_count: self.listed_count,
            created_at: self.created_at,
            verified: self.verified,
            description: self.description,
            timestamp,
        }
    }
}

impl From<&AccountRecord> for AccountRow {
    fn from(record: &AccountRecord) -> Self {
        Self {
            username: record.username.clone(),
            followers_count: record.followers_count,
            friends_count: record.friends_count,
            statuses_count: record.statuses_count,
            listed_count: record.listed_count,
            created_at: record.created_at.clone(),
            verified: record.verified,
            description: record.description.clone(),
            fetched_at: format_timestamp(&record.timestamp),
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the stored row for `username`, or `None` if it was never fetched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_account(pool: &PgPool, username: &str) -> Result<Option<AccountRow>, DbError> {
    let row = sqlx::query_as::<_, AccountRow>(
        "SELECT username, followers_count, friends_count, statuses_count, listed_count, \
                created_at, verified, description, fetched_at \
         FROM twitter_accounts \
         WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts or fully overwrites the row for `row.username`.
///
/// Every column is replaced; concurrent writers resolve last-write-wins.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn upsert_account(pool: &PgPool, row: &AccountRow) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO twitter_accounts \
             (username, followers_count, friends_count, statuses_count, listed_count, \
              created_at, verified, description, fetched_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         ON CONFLICT (username) DO UPDATE SET \
             followers_count = EXCLUDED.followers_count, \
             friends_count = EXCLUDED.friends_count, \
             statuses_count = EXCLUDED.statuses_count, \
             listed_count = EXCLUDED.listed_count, \
             created_at = EXCLUDED.created_at, \
             verified = EXCLUDED.verified, \
             description = EXCLUDED.description, \
             fetched_at = EXCLUDED.fetched_at",
    )
    .bind(&row.username)
    .bind(row.followers_count)
    .bind(row.friends_count)
    .bind(row.statuses_count)
    .bind(row.listed_count)
    .bind(&row.created_at)
    .bind(row.verified)
    .bind(&row.description)
    .bind(&row.fetched_at)
    .execute(pool)
    .await?;

    tracing::debug!(username = %row.username, fetched_at = %row.fetched_at, "account row upserted");
    Ok(())
}
