//! Staleness window over the account store.
//!
//! A stored record is trusted only while `now - fetched_at < window`. A row
//! whose stored timestamp does not parse is never fresh.

use std::sync::Arc;

use chrono::{NaiveDateTime, TimeDelta};
use fakescan_core::AccountRecord;
use fakescan_db::DbError;

use crate::sources::AccountStore;

/// Outcome of [`FreshnessCache::lookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Fresh(AccountRecord),
    Stale(StaleReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    Absent,
    Expired { age: TimeDelta },
    UnreadableTimestamp,
}

#[derive(Clone)]
pub struct FreshnessCache {
    store: Arc<dyn AccountStore>,
    window: TimeDelta,
}

impl std::fmt::Debug for FreshnessCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreshnessCache")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl FreshnessCache {
    #[must_use]
    pub fn new(store: Arc<dyn AccountStore>, window_secs: u64) -> Self {
        let window = i64::try_from(window_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        Self { store, window }
    }

    #[must_use]
    pub fn window(&self) -> TimeDelta {
        self.window
    }

    /// Reads the stored row for `username` and judges it against `now`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be read.
    pub async fn lookup(&self, username: &str, now: NaiveDateTime) -> Result<CacheLookup, DbError> {
        let Some(row) = self.store.get(username).await? else {
            return Ok(CacheLookup::Stale(StaleReason::Absent));
        };
        let Some(fetched_at) = row.fetched_at() else {
            tracing::warn!(
                username,
                stored = %row.fetched_at,
                "stored fetch timestamp is unreadable, treating as stale"
            );
            return Ok(CacheLookup::Stale(StaleReason::UnreadableTimestamp));
        };

        let age = now - fetched_at;
        if age < self.window {
            Ok(CacheLookup::Fresh(row.into_record(fetched_at)))
        } else {
            Ok(CacheLookup::Stale(StaleReason::Expired { age }))
        }
    }

    /// Stamps `record` with `now` and upserts it, returning the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the write fails.
    pub async fn store(
        &self,
        record: AccountRecord,
        now: NaiveDateTime,
    ) -> Result<AccountRecord, DbError> {
        let record = record.stamped(now);
        self.store.put(&record).await?;
        Ok(record)
    }
}
