//! Response payloads for `GET /users/by/username/{username}` and the mapping
//! onto [`AccountRecord`].

use fakescan_core::{now_local, AccountRecord, CREATED_AT_UNKNOWN};
use serde::Deserialize;

/// Result of looking up one username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Found(AccountRecord),
    NotFound(NotFoundReason),
}

/// Why a lookup produced no account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The provider answered and reported no such user.
    Missing,
    /// Every bearer token failed.
    Exhausted { attempts: usize },
}

#[derive(Debug, Deserialize)]
pub struct UserLookupResponse {
    pub data: Option<UserPayload>,
    #[serde(default)]
    pub errors: Vec<ApiProblem>,
}

#[derive(Debug, Deserialize)]
pub struct ApiProblem {
    pub title: Option<String>,
    pub detail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserPayload {
    pub created_at: Option<String>,
    pub description: Option<String>,
    pub verified: Option<bool>,
    pub public_metrics: Option<PublicMetrics>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PublicMetrics {
    pub followers_count: Option<i64>,
    pub following_count: Option<i64>,
    pub tweet_count: Option<i64>,
    pub listed_count: Option<i64>,
}

impl UserPayload {
    /// Builds the record stored under `username` (the name that was looked up).
    ///
    /// Provider `following_count` becomes `friends_count` and `tweet_count`
    /// becomes `statuses_count`. Missing metrics stay `None`.
    #[must_use]
    pub fn into_record(self, username: &str) -> AccountRecord {
        let metrics = self.public_metrics.unwrap_or_default();
        AccountRecord {
            username: username.to_owned(),
            followers_count: metrics.followers_count,
            friends_count: metrics.following_count,
            statuses_count: metrics.tweet_count,
            listed_count: metrics.listed_count,
            created_at: self
                .created_at
                .unwrap_or_else(|| CREATED_AT_UNKNOWN.to_owned()),
            verified: self.verified.unwrap_or(false),
            description: self.description.unwrap_or_default(),
            timestamp: now_local(),
        }
    }
}
