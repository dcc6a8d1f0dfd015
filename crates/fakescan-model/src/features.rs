//! Feature extraction from account records.

use fakescan_core::AccountRecord;

use crate::error::FeatureError;
use crate::Features;

pub const N_FEATURES: usize = 4;

/// Column order shared by the training datasets and inference.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "followers_count",
    "friends_count",
    "statuses_count",
    "listed_count",
];

/// Unscaled classifier input in [`FEATURE_NAMES`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(Features);

impl FeatureVector {
    #[must_use]
    pub fn new(values: Features) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn as_array(&self) -> &Features {
        &self.0
    }
}

/// Builds the feature vector for `record`.
///
/// No scaling happens here; the classifier applies its fitted scaler.
///
/// # Errors
///
/// Returns [`FeatureError::Missing`] when a count is absent and
/// [`FeatureError::Invalid`] when a count is negative.
pub fn extract_features(record: &AccountRecord) -> Result<FeatureVector, FeatureError> {
    let raw = [
        record.followers_count,
        record.friends_count,
        record.statuses_count,
        record.listed_count,
    ];

    let mut values = [0.0; N_FEATURES];
    for ((slot, value), field) in values.iter_mut().zip(raw).zip(FEATURE_NAMES) {
        let count = value.ok_or_else(|| FeatureError::Missing {
            username: record.username.clone(),
            field,
        })?;
        if count < 0 {
            return Err(FeatureError::Invalid {
                username: record.username.clone(),
                field,
                value: count,
            });
        }
        #[allow(clippy::cast_precision_loss)]
        {
            *slot = count as f64;
        }
    }

    Ok(FeatureVector(values))
}
