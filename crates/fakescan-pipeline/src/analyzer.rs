//! Request orchestration: normalize, consult the cache, fetch on a miss,
//! classify.

use std::sync::Arc;

use chrono::NaiveDateTime;
use fakescan_core::{now_local, AccountRecord, ClassificationResult, Provenance};
use fakescan_db::DbError;
use fakescan_model::{extract_features, Classifier, FeatureError};
use fakescan_twitter::{FetchOutcome, NotFoundReason};
use thiserror::Error;

use crate::cache::{CacheLookup, FreshnessCache};
use crate::sources::AccountSource;

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("Please enter a username")]
    InvalidUsername,

    /// Both "no such account" and "every credential failed" land here.
    #[error("User not found")]
    NotFound(NotFoundReason),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Store(#[from] DbError),
}

/// Classification plus the record it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub result: ClassificationResult,
    pub record: AccountRecord,
}

/// Trims whitespace and any leading `@` characters.
#[must_use]
pub fn normalize_username(raw: &str) -> &str {
    raw.trim().trim_start_matches('@')
}

pub struct Analyzer {
    classifier: Arc<Classifier>,
    cache: FreshnessCache,
    source: Arc<dyn AccountSource>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("classifier", &self.classifier)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Analyzer {
    #[must_use]
    pub fn new(
        classifier: Arc<Classifier>,
        cache: FreshnessCache,
        source: Arc<dyn AccountSource>,
    ) -> Self {
        Self {
            classifier,
            cache,
            source,
        }
    }

    #[must_use]
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Classifies `raw_username` using the current local time for staleness.
    ///
    /// # Errors
    ///
    /// See [`Analyzer::analyze_at`].
    pub async fn analyze(&self, raw_username: &str) -> Result<Analysis, AnalyzeError> {
        self.analyze_at(raw_username, now_local()).await
    }

    /// Classifies `raw_username`, judging cache freshness against `now`.
    ///
    /// A fresh stored record is classified without any outbound call.
    /// Otherwise the account is fetched, stored stamped with `now`, and
    /// classified. Nothing is stored when the fetch finds no account.
    ///
    /// # Errors
    ///
    /// - [`AnalyzeError::InvalidUsername`] for a blank username, before any I/O.
    /// - [`AnalyzeError::NotFound`] when the fetcher has no account.
    /// - [`AnalyzeError::Feature`] when the record lacks a count.
    /// - [`AnalyzeError::Store`] when the store fails.
    pub async fn analyze_at(
        &self,
        raw_username: &str,
        now: NaiveDateTime,
    ) -> Result<Analysis, AnalyzeError> {
        let username = normalize_username(raw_username);
        if username.is_empty() {
            return Err(AnalyzeError::InvalidUsername);
        }

        let (record, source) = match self.cache.lookup(username, now).await? {
            CacheLookup::Fresh(record) => {
                tracing::debug!(username, "serving cached account");
                (record, Provenance::Cache)
            }
            CacheLookup::Stale(reason) => {
                tracing::debug!(username, ?reason, "cache miss, fetching account");
                match self.source.fetch(username).await {
                    FetchOutcome::Found(record) => {
                        let record = self.cache.store(record, now).await?;
                        (record, Provenance::LiveFetch)
                    }
                    FetchOutcome::NotFound(reason) => {
                        tracing::info!(username, ?reason, "account not found");
                        return Err(AnalyzeError::NotFound(reason));
                    }
                }
            }
        };

        let features = extract_features(&record)?;
        let prediction = self.classifier.predict(&features);
        let result = ClassificationResult {
            label: prediction.label,
            confidence: prediction.confidence(),
            source,
        };

        tracing::info!(
            username,
            prediction = %result.label,
            confidence = result.confidence,
            source = %result.source,
            "account classified"
        );
        Ok(Analysis { result, record })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use fakescan_core::Label;

    use super::*;
    use crate::sources::AccountStore;
    use crate::testing::{at, bot_record, classifier, record, MemoryStore, StubSource};

    const WINDOW: u64 = 3 * 60 * 60;

    struct Harness {
        store: Arc<MemoryStore>,
        source: Arc<StubSource>,
        analyzer: Analyzer,
    }

    fn harness(source: StubSource) -> Harness {
        let store = Arc::new(MemoryStore::default());
        let source = Arc::new(source);
        let cache = FreshnessCache::new(Arc::clone(&store) as Arc<dyn AccountStore>, WINDOW);
        let analyzer = Analyzer::new(
            classifier(),
            cache,
            Arc::clone(&source) as Arc<dyn AccountSource>,
        );
        Harness {
            store,
            source,
            analyzer,
        }
    }

    #[test]
    fn normalize_strips_whitespace_and_at_signs() {
        assert_eq!(normalize_username("  @alice "), "alice");
        assert_eq!(normalize_username("@@bob"), "bob");
        assert_eq!(normalize_username("carol"), "carol");
        assert_eq!(normalize_username(" @ "), "");
        assert_eq!(normalize_username("a@b"), "a@b");
    }

    #[tokio::test]
    async fn uncached_account_is_fetched_stored_and_classified() {
        let alice = AccountRecord {
            verified: true,
            ..record("alice")
        };
        let h = harness(StubSource::with([alice]));

        let analysis = h.analyzer.analyze_at("@alice", at(12, 0, 0)).await.unwrap();

        assert_eq!(analysis.result.label, Label::Genuine);
        assert_eq!(analysis.result.source, Provenance::LiveFetch);
        assert!((0.0..=100.0).contains(&analysis.result.confidence));
        assert!(analysis.record.verified);
        assert_eq!(analysis.record.timestamp, at(12, 0, 0));
        assert_eq!(h.source.call_count(), 1);

        let row = h.store.row("alice").unwrap();
        assert_eq!(row.fetched_at, "2026-03-01 12:00:00");
        assert!(row.verified);
        assert_eq!(row.followers_count, Some(1000));
        assert_eq!(row.friends_count, Some(200));
        assert_eq!(row.statuses_count, Some(500));
        assert_eq!(row.listed_count, Some(10));
        assert_eq!(row.created_at, "2012-06-01T08:30:00.000Z");
        assert_eq!(row.description, "coffee and code");
    }

    #[tokio::test]
    async fn verified_flag_survives_the_cache_round_trip() {
        let alice = AccountRecord {
            verified: true,
            ..record("alice")
        };
        let h = harness(StubSource::with([alice]));

        h.analyzer.analyze_at("alice", at(12, 0, 0)).await.unwrap();
        let cached = h.analyzer.analyze_at("alice", at(12, 30, 0)).await.unwrap();

        assert_eq!(cached.result.source, Provenance::Cache);
        assert!(cached.record.verified);
        assert_eq!(h.source.call_count(), 1);
    }

    #[tokio::test]
    async fn fresh_cached_account_skips_the_fetch() {
        let h = harness(StubSource::default());
        h.store.insert(&bot_record("bob").stamped(at(11, 0, 0)));

        let analysis = h.analyzer.analyze_at("bob", at(12, 0, 0)).await.unwrap();

        assert_eq!(analysis.result.label, Label::Fake);
        assert_eq!(analysis.result.source, Provenance::Cache);
        assert_eq!(analysis.record.timestamp, at(11, 0, 0));
        assert_eq!(h.source.call_count(), 0);
        assert_eq!(h.store.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn expired_cached_account_is_refetched() {
        let mut refreshed = bot_record("bob");
        refreshed.followers_count = Some(7);
        let h = harness(StubSource::with([refreshed]));
        h.store.insert(&bot_record("bob").stamped(at(9, 0, 0)));

        let analysis = h.analyzer.analyze_at("bob", at(12, 0, 0)).await.unwrap();

        assert_eq!(analysis.result.source, Provenance::LiveFetch);
        assert_eq!(h.source.call_count(), 1);
        let row = h.store.row("bob").unwrap();
        assert_eq!(row.followers_count, Some(7));
        assert_eq!(row.fetched_at, "2026-03-01 12:00:00");
    }

    #[tokio::test]
    async fn blank_username_fails_before_any_io() {
        let h = harness(StubSource::with([record("alice")]));

        for raw in ["", "   ", "@", " @ "] {
            let err = h.analyzer.analyze_at(raw, at(12, 0, 0)).await.unwrap_err();
            assert!(matches!(err, AnalyzeError::InvalidUsername), "{raw:?}");
        }
        assert_eq!(h.store.io_count(), 0);
        assert_eq!(h.source.call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_account_is_not_found_and_not_stored() {
        let h = harness(StubSource::default());

        let err = h.analyzer.analyze_at("ghost", at(12, 0, 0)).await.unwrap_err();

        assert!(matches!(
            err,
            AnalyzeError::NotFound(NotFoundReason::Exhausted { attempts: 2 })
        ));
        assert_eq!(err.to_string(), "User not found");
        assert_eq!(h.store.len(), 0);
        assert_eq!(h.store.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cached_record_missing_a_count_is_a_feature_error() {
        let h = harness(StubSource::default());
        let mut incomplete = record("dave").stamped(at(11, 30, 0));
        incomplete.listed_count = None;
        h.store.insert(&incomplete);

        let err = h.analyzer.analyze_at("dave", at(12, 0, 0)).await.unwrap_err();

        assert!(matches!(
            err,
            AnalyzeError::Feature(FeatureError::Missing {
                field: "listed_count",
                ..
            })
        ));
        assert_eq!(h.source.call_count(), 0);
    }

    #[tokio::test]
    async fn unreadable_cached_timestamp_triggers_a_fetch() {
        let h = harness(StubSource::with([record("erin")]));
        h.store.insert_raw("erin", "not-a-date");

        let analysis = h.analyzer.analyze_at("erin", at(12, 0, 0)).await.unwrap();

        assert_eq!(analysis.result.source, Provenance::LiveFetch);
        assert_eq!(h.source.call_count(), 1);
    }

    #[tokio::test]
    async fn store_failure_is_reported() {
        let h = harness(StubSource::with([record("alice")]));
        h.store.fail.store(true, Ordering::SeqCst);

        let err = h.analyzer.analyze_at("alice", at(12, 0, 0)).await.unwrap_err();

        assert!(matches!(err, AnalyzeError::Store(_)));
        assert_eq!(h.source.call_count(), 0);
    }

    #[tokio::test]
    async fn second_request_inside_window_hits_the_cache() {
        let h = harness(StubSource::with([record("alice")]));

        let first = h.analyzer.analyze_at("alice", at(12, 0, 0)).await.unwrap();
        let second = h.analyzer.analyze_at("alice", at(14, 59, 59)).await.unwrap();
        let third = h.analyzer.analyze_at("alice", at(15, 0, 0)).await.unwrap();

        assert_eq!(first.result.source, Provenance::LiveFetch);
        assert_eq!(second.result.source, Provenance::Cache);
        assert_eq!(second.result.label, first.result.label);
        assert_eq!(third.result.source, Provenance::LiveFetch);
        assert_eq!(h.source.call_count(), 2);
    }
}
