//! Account classification model.
//!
//! Extracts the four count features from an [`AccountRecord`], scales them
//! with a min-max scaler fitted once on the training corpus, and scores them
//! with a soft-voting ensemble of a random forest, a gradient-boosted tree
//! ensemble and an L2-regularised logistic regression.
//!
//! [`AccountRecord`]: fakescan_core::AccountRecord

pub mod corpus;
pub mod ensemble;
pub mod error;
pub mod features;

mod boosting;
mod forest;
mod logistic;
mod scaler;
mod tree;

pub use corpus::{LabeledSample, TrainingCorpus};
pub use ensemble::{Classifier, EnsembleParams, LearnerAccuracy, ModelSummary, Prediction};
pub use error::{FeatureError, ModelError};
pub use features::{extract_features, FeatureVector, FEATURE_NAMES, N_FEATURES};

/// Raw or scaled feature values in [`FEATURE_NAMES`] order.
pub type Features = [f64; N_FEATURES];

/// A fitted model that scores a scaled feature row.
pub(crate) trait BaseLearner: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns `[P(genuine), P(fake)]`.
    fn predict_proba(&self, x: &Features) -> [f64; 2];
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
