//! HTTP client for the Twitter API v2 user lookup endpoint.
//!
//! Wraps `reqwest` with bearer-token rotation and typed response
//! deserialization. A failed attempt (network, non-2xx status, undecodable
//! body) moves on to the next token; a decoded response without `data` means
//! the provider has no such user and ends the lookup.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::TwitterError;
use crate::rotation::rotate_credentials;
use crate::types::{FetchOutcome, NotFoundReason, UserLookupResponse, UserPayload};

const DEFAULT_BASE_URL: &str = "https://api.twitter.com/2/";
const USER_FIELDS: &str = "public_metrics,created_at,description,verified";

/// Client for the Twitter API v2.
///
/// Holds the HTTP client, the ordered bearer-token pool and the base URL. Use
/// [`TwitterClient::new`] for production or [`TwitterClient::with_base_url`]
/// to point at a mock server in tests.
pub struct TwitterClient {
    client: Client,
    bearer_tokens: Vec<String>,
    base_url: Url,
}

impl std::fmt::Debug for TwitterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterClient")
            .field("base_url", &self.base_url.as_str())
            .field("bearer_tokens", &format!("[{} redacted]", self.bearer_tokens.len()))
            .finish_non_exhaustive()
    }
}

impl TwitterClient {
    /// Creates a client pointed at the production Twitter API.
    ///
    /// # Errors
    ///
    /// Returns [`TwitterError::NoCredentials`] for an empty token pool and
    /// [`TwitterError::Http`] if the underlying `reqwest::Client` cannot be
    /// constructed.
    pub fn new(bearer_tokens: Vec<String>, timeout_secs: u64) -> Result<Self, TwitterError> {
        Self::with_base_url(bearer_tokens, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Same as [`TwitterClient::new`], plus [`TwitterError::InvalidBaseUrl`]
    /// if `base_url` does not parse.
    pub fn with_base_url(
        bearer_tokens: Vec<String>,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, TwitterError> {
        if bearer_tokens.is_empty() {
            return Err(TwitterError::NoCredentials);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent("fakescan/0.1 (account-classification)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| TwitterError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(TwitterError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: "URL cannot be used as a base".to_owned(),
            });
        }

        Ok(Self {
            client,
            bearer_tokens,
            base_url: parsed,
        })
    }

    #[must_use]
    pub fn credential_count(&self) -> usize {
        self.bearer_tokens.len()
    }

    /// Looks up `username`, trying each bearer token in order.
    ///
    /// Never fails: transport problems are absorbed by rotation and surface as
    /// [`NotFoundReason::Exhausted`] once every token has been tried.
    pub async fn fetch_account(&self, username: &str) -> FetchOutcome {
        let url = self.lookup_url(username);

        let result = rotate_credentials(&self.bearer_tokens, |token| {
            let url = url.clone();
            async move { self.lookup_once(url, token).await }
        })
        .await;

        match result {
            Ok(Some(payload)) => {
                tracing::debug!(username, "twitter account fetched");
                FetchOutcome::Found(payload.into_record(username))
            }
            Ok(None) => {
                tracing::info!(username, "twitter reports no such account");
                FetchOutcome::NotFound(NotFoundReason::Missing)
            }
            Err(exhausted) => {
                tracing::warn!(
                    username,
                    attempts = exhausted.attempts,
                    last_error = ?exhausted.last_error.as_ref().map(ToString::to_string),
                    "all bearer tokens failed"
                );
                FetchOutcome::NotFound(NotFoundReason::Exhausted {
                    attempts: exhausted.attempts,
                })
            }
        }
    }

    /// Builds `{base}/users/by/username/{username}?user.fields=...` with the
    /// username percent-encoded as a single path segment.
    fn lookup_url(&self, username: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["users", "by", "username", username]);
        }
        url.query_pairs_mut().append_pair("user.fields", USER_FIELDS);
        url
    }

    /// One request with one token. `Ok(None)` means the provider answered
    /// without a `data` object.
    async fn lookup_once(&self, url: Url, token: &str) -> Result<Option<UserPayload>, TwitterError> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(token)
            .send()
            .await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        let envelope: UserLookupResponse =
            serde_json::from_str(&body).map_err(|e| TwitterError::Deserialize {
                context: url.path().to_owned(),
                source: e,
            })?;

        if envelope.data.is_none() {
            for problem in &envelope.errors {
                tracing::debug!(
                    title = problem.title.as_deref().unwrap_or(""),
                    detail = problem.detail.as_deref().unwrap_or(""),
                    "twitter lookup returned an error entry"
                );
            }
        }
        Ok(envelope.data)
    }
}
