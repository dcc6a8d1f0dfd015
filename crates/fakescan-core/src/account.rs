//! Account records and classification results shared across the workspace.

use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};

/// Storage and display format for the fetch timestamp (local time).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Sentinel stored in `created_at` when the provider omits the field.
pub const CREATED_AT_UNKNOWN: &str = "unknown";

/// One account's known state, as fetched from the provider or read back from
/// the store.
///
/// The four count fields are optional so a record that lacks one can still be
/// represented; classification rejects such records instead of defaulting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub username: String,
    pub followers_count: Option<i64>,
    pub friends_count: Option<i64>,
    pub statuses_count: Option<i64>,
    pub listed_count: Option<i64>,
    pub created_at: String,
    pub verified: bool,
    pub description: String,
    #[serde(with = "timestamp_serde")]
    pub timestamp: NaiveDateTime,
}

impl AccountRecord {
    /// Returns a copy of this record stamped with `timestamp`.
    #[must_use]
    pub fn stamped(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Binary classifier output label. Class index 0 is genuine, 1 is fake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Genuine,
    Fake,
}

impl Label {
    /// Maps a class index to a label. Any non-zero index is treated as fake.
    #[must_use]
    pub fn from_class(class: usize) -> Self {
        if class == 0 {
            Label::Genuine
        } else {
            Label::Fake
        }
    }

    #[must_use]
    pub fn class_index(self) -> usize {
        match self {
            Label::Genuine => 0,
            Label::Fake => 1,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Genuine => "genuine",
            Label::Fake => "fake",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the record behind a classification came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    #[serde(rename = "cache")]
    Cache,
    #[serde(rename = "live-fetch")]
    LiveFetch,
}

impl Provenance {
    /// Human-readable source label for display surfaces.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Provenance::Cache => "Database Cache",
            Provenance::LiveFetch => "Twitter API",
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Cache => f.write_str("cache"),
            Provenance::LiveFetch => f.write_str("live-fetch"),
        }
    }
}

/// Per-request classification. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub label: Label,
    /// Maximum class probability × 100, rounded to one decimal.
    pub confidence: f64,
    pub source: Provenance,
}

/// Current local time truncated to whole seconds, matching the stored
/// precision of [`TIMESTAMP_FORMAT`].
#[must_use]
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

#[must_use]
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp. Returns `None` for anything not in
/// [`TIMESTAMP_FORMAT`].
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).ok()
}

mod timestamp_serde {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_timestamp(ts))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
    }
}
