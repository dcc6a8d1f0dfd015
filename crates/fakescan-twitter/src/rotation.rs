//! Sequential fallback across a pool of bearer tokens.
//!
//! [`rotate_credentials`] runs one attempt per token, in order, and stops at
//! the first success. There is no back-off between tokens; the pool size is
//! the attempt budget.

use std::future::Future;

use crate::error::TwitterError;

/// Every credential was tried and every attempt failed.
#[derive(Debug)]
pub(crate) struct Exhausted {
    pub attempts: usize,
    pub last_error: Option<TwitterError>,
}

/// Runs `attempt` with each credential until one returns `Ok`.
pub(crate) async fn rotate_credentials<'a, T, F, Fut>(
    credentials: &'a [String],
    mut attempt: F,
) -> Result<T, Exhausted>
where
    F: FnMut(&'a str) -> Fut,
    Fut: Future<Output = Result<T, TwitterError>>,
{
    let total = credentials.len();
    let mut last_error = None;

    for (index, credential) in credentials.iter().enumerate() {
        match attempt(credential.as_str()).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                tracing::warn!(
                    attempt = index + 1,
                    total,
                    error = %err,
                    "twitter lookup failed, rotating to next bearer token"
                );
                last_error = Some(err);
            }
        }
    }

    Err(Exhausted {
        attempts: total,
        last_error,
    })
}
