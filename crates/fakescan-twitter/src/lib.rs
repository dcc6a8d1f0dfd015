//! Twitter API v2 account metadata fetcher.
//!
//! [`TwitterClient::fetch_account`] looks up a user by username, rotating
//! through the configured bearer tokens until one of them yields an answer.

pub mod client;
pub mod error;
mod rotation;
pub mod types;

pub use client::TwitterClient;
pub use error::TwitterError;
pub use types::{FetchOutcome, NotFoundReason};
