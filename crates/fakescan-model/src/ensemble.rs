//! Soft-voting ensemble and the trained classifier handle.

use std::fmt;
use std::path::Path;
use std::time::Instant;

use fakescan_core::Label;
use serde::Serialize;

use crate::boosting::GradientBoosting;
use crate::corpus::TrainingCorpus;
use crate::error::ModelError;
use crate::features::FeatureVector;
use crate::forest::RandomForest;
use crate::logistic::LogisticRegression;
use crate::scaler::MinMaxScaler;
use crate::{BaseLearner, Features};

/// Hyperparameters for the three base learners.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleParams {
    pub forest_estimators: usize,
    pub boosting_stages: usize,
    pub learning_rate: f64,
    pub boosting_max_depth: usize,
    /// Inverse L2 regularisation strength.
    pub logistic_c: f64,
    pub logistic_max_iter: usize,
    pub seed: u64,
}

impl Default for EnsembleParams {
    fn default() -> Self {
        Self {
            forest_estimators: 150,
            boosting_stages: 150,
            learning_rate: 0.1,
            boosting_max_depth: 3,
            logistic_c: 1.0,
            logistic_max_iter: 1000,
            seed: 42,
        }
    }
}

impl EnsembleParams {
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

/// Ensemble output for one account.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: Label,
    /// `[P(genuine), P(fake)]`, summing to 1.
    pub probabilities: [f64; 2],
}

impl Prediction {
    /// Picks the class with the larger probability; a tie goes to genuine.
    #[must_use]
    pub fn from_probabilities(probabilities: [f64; 2]) -> Self {
        let label = Label::from_class(usize::from(probabilities[1] > probabilities[0]));
        Self {
            label,
            probabilities,
        }
    }

    /// Winning probability as a percentage rounded to one decimal place.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        let top = self.probabilities[0].max(self.probabilities[1]);
        (top * 1000.0).round() / 10.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LearnerAccuracy {
    pub name: &'static str,
    pub training_accuracy: f64,
}

/// What was trained, reported at startup and by the model endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub genuine_samples: usize,
    pub fake_samples: usize,
    pub learners: Vec<LearnerAccuracy>,
    pub ensemble_training_accuracy: f64,
}

/// The fitted scaler plus the three voting learners.
///
/// Built once at startup and shared read-only afterwards.
pub struct Classifier {
    scaler: MinMaxScaler,
    learners: Vec<Box<dyn BaseLearner>>,
    summary: ModelSummary,
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}

impl Classifier {
    /// Loads both datasets and trains the ensemble.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] when either dataset cannot be loaded.
    pub fn from_datasets(
        genuine_path: &Path,
        fake_path: &Path,
        params: &EnsembleParams,
    ) -> Result<Self, ModelError> {
        let corpus = TrainingCorpus::load(genuine_path, fake_path)?;
        Ok(Self::train(&corpus, params))
    }

    /// Fits the scaler on the whole corpus, then every learner on the scaled rows.
    #[must_use]
    pub fn train(corpus: &TrainingCorpus, params: &EnsembleParams) -> Self {
        let started = Instant::now();
        let scaler = MinMaxScaler::fit(corpus.samples().iter().map(|s| &s.features));
        let x: Vec<Features> = corpus
            .samples()
            .iter()
            .map(|s| scaler.transform(&s.features))
            .collect();
        #[allow(clippy::cast_precision_loss)]
        let y: Vec<f64> = corpus
            .samples()
            .iter()
            .map(|s| s.label.class_index() as f64)
            .collect();

        let learners: Vec<Box<dyn BaseLearner>> = vec![
            Box::new(RandomForest::fit(&x, &y, params.forest_estimators, params.seed)),
            Box::new(GradientBoosting::fit(
                &x,
                &y,
                params.boosting_stages,
                params.learning_rate,
                params.boosting_max_depth,
                params.seed,
            )),
            Box::new(LogisticRegression::fit(
                &x,
                &y,
                params.logistic_c,
                params.logistic_max_iter,
            )),
        ];

        let labels: Vec<Label> = corpus.samples().iter().map(|s| s.label).collect();
        let learner_accuracy = learners
            .iter()
            .map(|learner| LearnerAccuracy {
                name: learner.name(),
                training_accuracy: accuracy(&x, &labels, |row| {
                    Prediction::from_probabilities(learner.predict_proba(row)).label
                }),
            })
            .collect();
        let ensemble_training_accuracy = accuracy(&x, &labels, |row| {
            Prediction::from_probabilities(soft_vote(&learners, row)).label
        });

        let (genuine_samples, fake_samples) = corpus.class_counts();
        let summary = ModelSummary {
            genuine_samples,
            fake_samples,
            learners: learner_accuracy,
            ensemble_training_accuracy,
        };

        tracing::info!(
            genuine = genuine_samples,
            fake = fake_samples,
            accuracy = ensemble_training_accuracy,
            elapsed_ms = started.elapsed().as_millis(),
            "ensemble trained"
        );
        for learner in &summary.learners {
            tracing::debug!(
                learner = learner.name,
                accuracy = learner.training_accuracy,
                "base learner trained"
            );
        }

        Self {
            scaler,
            learners,
            summary,
        }
    }

    /// Scales `features` with the training-time scaler and soft-votes.
    #[must_use]
    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        let scaled = self.scaler.transform(features.as_array());
        Prediction::from_probabilities(soft_vote(&self.learners, &scaled))
    }

    #[must_use]
    pub fn summary(&self) -> &ModelSummary {
        &self.summary
    }
}

#[allow(clippy::cast_precision_loss)]
fn soft_vote(learners: &[Box<dyn BaseLearner>], x: &Features) -> [f64; 2] {
    let total = learners.iter().fold([0.0, 0.0], |acc, learner| {
        let p = learner.predict_proba(x);
        [acc[0] + p[0], acc[1] + p[1]]
    });
    let n = learners.len().max(1) as f64;
    [total[0] / n, total[1] / n]
}

#[allow(clippy::cast_precision_loss)]
fn accuracy(x: &[Features], labels: &[Label], predict: impl Fn(&Features) -> Label) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let correct = x
        .iter()
        .zip(labels)
        .filter(|(row, label)| predict(row) == **label)
        .count();
    correct as f64 / x.len() as f64
}
