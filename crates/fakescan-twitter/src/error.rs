use thiserror::Error;

/// Errors returned by the Twitter API client.
///
/// Failures of a single lookup attempt are recovered by moving on to the next
/// bearer token; callers only see them when constructing the client.
#[derive(Debug, Error)]
pub enum TwitterError {
    /// Network or TLS failure, or a non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("no bearer tokens configured")]
    NoCredentials,
}
