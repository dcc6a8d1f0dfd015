//! In-memory doubles for the pipeline's collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use fakescan_core::{AccountRecord, Label};
use fakescan_db::{AccountRow, DbError};
use fakescan_model::{Classifier, EnsembleParams, LabeledSample, TrainingCorpus};
use fakescan_twitter::{FetchOutcome, NotFoundReason};

use crate::sources::{AccountSource, AccountStore};

pub(crate) fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 1)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

/// Genuine-looking account.
pub(crate) fn record(username: &str) -> AccountRecord {
    AccountRecord {
        username: username.to_string(),
        followers_count: Some(1000),
        friends_count: Some(200),
        statuses_count: Some(500),
        listed_count: Some(10),
        created_at: "2012-06-01T08:30:00.000Z".to_string(),
        verified: false,
        description: "coffee and code".to_string(),
        timestamp: at(0, 0, 0),
    }
}

/// Bot-looking account.
pub(crate) fn bot_record(username: &str) -> AccountRecord {
    AccountRecord {
        followers_count: Some(5),
        friends_count: Some(4000),
        statuses_count: Some(20_000),
        listed_count: Some(0),
        description: String::new(),
        ..record(username)
    }
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    rows: Mutex<HashMap<String, AccountRow>>,
    pub gets: AtomicUsize,
    pub puts: AtomicUsize,
    pub fail: AtomicBool,
}

impl MemoryStore {
    pub(crate) fn insert(&self, record: &AccountRecord) {
        self.rows
            .lock()
            .unwrap()
            .insert(record.username.clone(), AccountRow::from(record));
    }

    pub(crate) fn insert_raw(&self, username: &str, fetched_at: &str) {
        let mut row = AccountRow::from(&record(username));
        row.fetched_at = fetched_at.to_string();
        self.rows.lock().unwrap().insert(username.to_string(), row);
    }

    pub(crate) fn row(&self, username: &str) -> Option<AccountRow> {
        self.rows.lock().unwrap().get(username).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub(crate) fn io_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst) + self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn get(&self, username: &str) -> Result<Option<AccountRow>, DbError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(self.row(username))
    }

    async fn put(&self, record: &AccountRecord) -> Result<(), DbError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        self.insert(record);
        Ok(())
    }
}

/// Answers from a fixed table; unknown usernames exhaust two credentials.
#[derive(Default)]
pub(crate) struct StubSource {
    accounts: HashMap<String, AccountRecord>,
    pub calls: AtomicUsize,
}

impl StubSource {
    pub(crate) fn with(accounts: impl IntoIterator<Item = AccountRecord>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|r| (r.username.clone(), r))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountSource for StubSource {
    async fn fetch(&self, username: &str) -> FetchOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.accounts.get(username) {
            Some(record) => FetchOutcome::Found(record.clone()),
            None => FetchOutcome::NotFound(NotFoundReason::Exhausted { attempts: 2 }),
        }
    }
}

/// Small ensemble trained once on a clearly separable corpus.
pub(crate) fn classifier() -> Arc<Classifier> {
    static CLASSIFIER: OnceLock<Arc<Classifier>> = OnceLock::new();
    Arc::clone(CLASSIFIER.get_or_init(|| {
        let mut samples = Vec::new();
        for i in 0..25 {
            let j = f64::from(i);
            samples.push(LabeledSample {
                features: [800.0 + j * 20.0, 150.0 + j * 5.0, 400.0 + j * 15.0, 8.0 + j / 5.0],
                label: Label::Genuine,
            });
            samples.push(LabeledSample {
                features: [2.0 + j / 3.0, 3500.0 + j * 30.0, 18_000.0 + j * 100.0, 0.0],
                label: Label::Fake,
            });
        }
        let corpus = TrainingCorpus::from_samples(samples).unwrap();
        let params = EnsembleParams {
            forest_estimators: 20,
            boosting_stages: 20,
            ..EnsembleParams::default()
        };
        Arc::new(Classifier::train(&corpus, &params))
    }))
}
