//! Account-classification pipeline.
//!
//! Ties the freshness-gated store, the Twitter fetcher and the trained
//! classifier together behind [`Analyzer::analyze`].

pub mod analyzer;
pub mod cache;
pub mod sources;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use fakescan_core::AppConfig;
use fakescan_model::{Classifier, EnsembleParams, ModelError};
use fakescan_twitter::{TwitterClient, TwitterError};
use sqlx::PgPool;

pub use analyzer::{normalize_username, AnalyzeError, Analysis, Analyzer};
pub use cache::{CacheLookup, FreshnessCache, StaleReason};
pub use sources::{AccountSource, AccountStore, PgAccountStore};

/// Trains the ensemble from the datasets named in `config`.
///
/// CPU-bound; async callers should run it on a blocking thread.
///
/// # Errors
///
/// Returns [`ModelError`] if either dataset cannot be loaded.
pub fn train_classifier(config: &AppConfig) -> Result<Classifier, ModelError> {
    Classifier::from_datasets(
        &config.genuine_dataset_path,
        &config.fake_dataset_path,
        &EnsembleParams::with_seed(config.model_seed),
    )
}

/// Wires the Postgres store and the Twitter client into an [`Analyzer`].
///
/// # Errors
///
/// Returns [`TwitterError`] if the Twitter client cannot be built from
/// `config`.
pub fn build_analyzer(
    config: &AppConfig,
    pool: PgPool,
    classifier: Arc<Classifier>,
) -> Result<Analyzer, TwitterError> {
    let twitter = TwitterClient::with_base_url(
        config.twitter_bearer_tokens.clone(),
        config.twitter_timeout_secs,
        &config.twitter_api_base_url,
    )?;
    tracing::info!(
        credentials = twitter.credential_count(),
        staleness_window_secs = config.staleness_window_secs,
        "analyzer ready"
    );
    let cache = FreshnessCache::new(
        Arc::new(PgAccountStore::new(pool)),
        config.staleness_window_secs,
    );
    Ok(Analyzer::new(classifier, cache, Arc::new(twitter)))
}
